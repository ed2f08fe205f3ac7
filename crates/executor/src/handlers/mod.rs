//! Operation handlers organized by component.
//!
//! | Module | Operations | Component |
//! |--------|------------|-----------|
//! | `about` | about, ops, formats | server metadata |
//! | `read` | read, nav | EntityAccess |
//! | `watch` | watchSub, watchUnsub, watchPoll | WatchManager |
//! | `point_write` | pointWrite | WriteRegister |
//! | `his` | hisRead, hisWrite | History |
//! | `action` | invokeAction | Database |
//!
//! Every handler validates its own request shape and fails with
//! `MalformedRequest` before touching any state.

pub mod about;
pub mod action;
pub mod his;
pub mod point_write;
pub mod read;
pub mod watch;
