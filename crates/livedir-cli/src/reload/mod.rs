//! Live reload: watch the served tree, debounce changes, and push a
//! `sourcechange` event to every connected browser tab.
//!
//! The pieces, bottom-up:
//!
//! - [`Debouncer`] collapses bursts of calls per key into one delayed action.
//! - [`Broadcaster`] fans a notification out to every subscriber without
//!   ever blocking on a slow one.
//! - [`WatchLoop`] turns filesystem events into debounced notifications.
//! - [`handle_sse`] streams notifications to a browser.
//! - [`inject_reload`] adds the listener script to HTML responses.
//! - [`ReloadServer`] ties them to a static file server.

mod broadcaster;
mod debouncer;
mod failure;
mod ignore;
mod inject;
mod script;
mod server;
mod sse;
mod watcher;

pub use broadcaster::{Broadcaster, SubscriberId, Subscription, SUBSCRIBER_BUFFER};
pub use debouncer::Debouncer;
pub use failure::{debug_enabled, panic_response, server_error};
pub use ignore::{ChangeKind, IgnoreSet, DEFAULT_IGNORED_DIRS};
pub use inject::{inject_reload, PassthroughReason, RewriteError, Stage, BODY_CLOSE_TAG};
pub use script::{Injection, SOURCE_CHANGE_EVENT};
pub use server::{router, BoundServer, ReloadRoutes, ReloadServer};
pub use sse::{handle_sse, source_change_stream, ReloadState, SourceChange};
pub use watcher::{WatchLoop, RELOAD_KEY};
