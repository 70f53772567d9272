//! End-to-end checks against real sockets on the loopback interface.

mod loopback;
mod probing;
mod scanning;
mod session;
