//! # Events Module
//!
//! Event-driven progress reporting.
//!
//! ## Design
//! The core library reports progress through a [`ProgressSink`]. The sink
//! may ask the scan to stop by returning `false`. [`EventSender`] is a sink
//! that forwards every report into a channel so any UI can subscribe.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Progress(p) = event {
//!             println!("{}% {}", p.percent, p.message);
//!         }
//!     }
//! });
//!
//! let result = scanner.find_groups(&items, &sender)?;
//! ```

mod channel;
mod sink;
mod types;

pub use channel::{EventChannel, EventReceiver, EventSender, null_sender};
pub use sink::{CancellationToken, NullSink, ProgressSink};
pub use types::*;
