//! Sentry release API integration

mod client;

pub use client::{Artifact, ArtifactId, ReleaseScope, SentryApi};
