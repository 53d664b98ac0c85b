//! Status lifecycles
//!
//! Status-bearing entities move forward through declared edges only and
//! stop accepting status changes once they reach a terminal state. The
//! store consults the machine on every update that touches the status field.

mod machine;

pub use machine::{StatusMachine, TransitionRefusal};
