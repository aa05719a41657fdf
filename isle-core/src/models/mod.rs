pub mod island;
pub mod read;
pub mod span;
pub mod window;

// re-export for cleaner imports
pub use self::island::{AnnotatedIsland, DifferentialIsland, Island, UnionIsland};
pub use self::read::{Read, Strand};
pub use self::span::GenomicSpan;
pub use self::window::{ScoredWindow, Window};
