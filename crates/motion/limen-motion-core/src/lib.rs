//! limen-motion-core: timelines, easing and scroll dynamics (engine-agnostic)

pub mod conductor;
pub mod ease;
pub mod glide;
pub mod ids;
pub mod scrub;
pub mod timeline;
pub mod tween;

pub use conductor::Conductor;
pub use ease::Ease;
pub use glide::GlideScroll;
pub use ids::TimelineId;
pub use scrub::{ScrubBinding, ScrubRange, ToggleBinding};
pub use timeline::{MotionEvent, Timeline, TimelineBuilder, TimelineState};
pub use tween::Tween;
