//! Herald Publish - Packaging tools, announcers and the target dispatcher
//!
//! Every target implements [`Processor`]: it builds its own context from the
//! shared [`herald_core::ReleaseModel`], renders its output, and delivers it.
//! The [`Dispatcher`] runs targets under a [`FailurePolicy`] and reports a
//! [`RunSummary`].

pub mod announce;
pub mod dispatcher;
pub mod error;
pub mod output;
pub mod processor;
pub mod resolve;
pub mod sender;
pub mod tools;

pub use announce::{SdkmanAnnouncer, SdkmanSender, ZulipAnnouncer, ZulipSender};
pub use dispatcher::{
    CancellationFlag, DispatchOptions, Dispatcher, FailurePolicy, RunSummary, SkipReason,
    TargetOutcome, TargetState,
};
pub use error::{PublishError, Result, SendError, Stage, StageError, TargetFailure};
pub use processor::{
    Delivery, DeliveryOptions, ManifestFile, Message, Processor, Rendered, TargetKind,
    announcers, registry, tools,
};
pub use resolve::resolve_model;
pub use sender::{RecordingSender, Sender};
pub use tools::{ScoopProcessor, resolve_self_updating};
