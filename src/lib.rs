//! Motionscope drives scroll-synchronized motion over a host render tree.
//!
//! The host owns layout and drawing. It hands the [`Orchestrator`] a [`RenderTree`]
//! (geometry in, animated properties out) and calls it on three events:
//!
//! 1. **tick**: the shared clock. Timelines, marquees, carousels and bursts advance.
//! 2. **scroll**: scroll triggers evaluate and start or reverse their timelines.
//! 3. **resize**: the viewport mode is recomputed; a flip replaces responsive scopes.
//!
//! Every timeline belongs to an [`AnimationScope`]. Disposing the scope cancels its
//! timelines where they stand and releases every listener it held; a second dispose is a
//! no-op. Missing targets never fail, they only skip work.
//!
//! A complete stage can also be described in JSON ([`StageConfig`]) and previewed with the
//! `motionscope` binary.
#![forbid(unsafe_code)]

mod foundation {
    pub(crate) mod core;
    pub(crate) mod error;
    pub(crate) mod rng;
    pub(crate) mod subscription;
}
mod target {
    pub(crate) mod tree;
}
mod animation {
    pub(crate) mod ease;
    pub(crate) mod keyframe;
    pub(crate) mod timeline;
}
mod scroll {
    pub(crate) mod trigger;
}
mod scope {
    #[allow(clippy::module_inception)]
    pub(crate) mod scope;
}
mod viewport {
    pub(crate) mod mode;
}
mod motion {
    pub(crate) mod burst;
    pub(crate) mod carousel;
    pub(crate) mod marquee;
}
mod stage {
    pub(crate) mod config;
    pub(crate) mod orchestrator;
}

pub use animation::ease::Ease;
pub use animation::keyframe::{KeyValue, Keyframe, ResolvedPair, validate_pair};
pub use animation::timeline::{Repeat, TickOutcome, Timeline, TimelineSpec, TimelineState};
pub use foundation::core::{
    Direction, ElementId, Lerp, Point, PropValue, Property, Rect, Vec2, ViewportMode,
};
pub use foundation::error::{MotionError, MotionResult};
pub use foundation::rng::Rng64;
pub use foundation::subscription::{ListenerKind, SubscriptionId, Subscriptions};
pub use motion::burst::{BurstConfig, BurstScheduler, BurstSession, Emission, FireOutcome};
pub use motion::carousel::CarouselScheduler;
pub use motion::marquee::MarqueeLoop;
pub use scope::scope::{
    AnimationScope, ScopeBuilder, ScopeId, ScopeState, TimelineHandle, TimelineId,
};
pub use scroll::trigger::{
    BindingId, ScrollBinding, ScrollDirection, ScrollSample, ScrollTriggerRegistry,
    TogglePolicy, TriggerAction, TriggerState,
};
pub use stage::config::{
    BurstDef, CarouselDef, MarqueeDef, ScopeDef, SceneElementDef, StageConfig, StageHandles,
    TimelineDef,
};
pub use stage::orchestrator::{
    BurstId, CarouselId, MarqueeId, MarqueeSpeeds, Orchestrator, ScopeBuildFn, ScopeHandle,
};
pub use target::tree::{Elements, RenderTree, SceneTree, VisualTarget};
pub use viewport::mode::{ViewportConfig, ViewportModeResolver};
