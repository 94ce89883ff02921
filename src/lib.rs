//! Resync the time stamps of SubRip (SRT) and SubStation Alpha (SSA/ASS)
//! subtitle files.
//!
//! A subtitle stream is read line by line, every time stamp found in a cue
//! timing line or a `Dialogue:` line is moved by a linear
//! [`Transform`](transform::Transform), and everything else is written back
//! unchanged. SRT serial numbers can be renumbered and a range of subtitles
//! can be chopped out on the way.
//!
//! Text encodings are handled on the fly: the input is checked for a byte
//! order mark, or read in an encoding given by name, and transcoded line by
//! line into the output encoding, UTF-8 by default.
//!
//! ```
//! use subsync::{retime, CodepageTable, RetimeOptions, Transform};
//!
//! let input = b"Dialogue: Marked=0,0:02:42.42,0:02:44.15,Wolf main,autre,0000,0000,0000,,Toujours rien.\n";
//! let options = RetimeOptions::new().with_transform(Transform::new().with_offset(-2000));
//!
//! let mut output = Vec::new();
//! retime(&input[..], &mut output, &options, &CodepageTable::new()).unwrap();
//!
//! assert_eq!(
//!     output,
//!     b"Dialogue: Marked=0,0:02:40.42,0:02:42.15,Wolf main,autre,0000,0000,0000,,Toujours rien.\n"
//! );
//! ```

pub mod codec;
pub mod codepage;
pub mod decode;
pub mod encode;
pub mod error;
pub mod retime;
pub mod timestamp;
pub mod transform;

pub use codepage::CodepageTable;
pub use error::{Error, Result};
pub use retime::chop::ChopRange;
pub use retime::{retime, RetimeOptions, RetimeReport};
pub use transform::{TimeRange, Transform};
