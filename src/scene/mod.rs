//! Host scene-graph adapter.
//!
//! An in-memory model of the host application's scene:
//! - Node: named scene node with hierarchy links, static transform, keyed
//!   channels and user properties
//! - Transform: static TRS value and the host rotation convention
//! - KeyChannel: tick-addressed keys with linear evaluation
//! - UserProps: string-backed typed node annotations
//! - Scene: node arena, hierarchy editing, time evaluation and the
//!   recording scope for animated writes

pub mod channel;
pub mod node;
pub mod props;
#[allow(clippy::module_inception)]
pub mod scene;
pub mod transform;

pub use channel::{ChannelMask, Key, KeyChannel, TransformChannels};
pub use node::Node;
pub use props::UserProps;
pub use scene::{RecordScope, Scene};
pub use transform::Transform;

use slotmap::new_key_type;

new_key_type! {
    pub struct NodeHandle;
}
