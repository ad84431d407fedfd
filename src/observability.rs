use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("coporties.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("coporties.client.request_errors");

pub(crate) static STREAM_CHUNKS: Counter = Counter::new("coporties.stream.chunks");
pub(crate) static STREAM_ERRORS: Counter = Counter::new("coporties.stream.errors");
pub(crate) static STREAM_BYTES: Counter = Counter::new("coporties.stream.bytes");
pub(crate) static STREAM_TTFB: Moments = Moments::new("coporties.stream.ttfb_seconds");

pub(crate) static ATTACHMENTS_CAPTURED: Counter = Counter::new("coporties.attachments.captured");
pub(crate) static ATTACHMENTS_REJECTED: Counter = Counter::new("coporties.attachments.rejected");

pub(crate) static CHAT_SENDS: Counter = Counter::new("coporties.chat.sends");
pub(crate) static CHAT_SEND_FAILURES: Counter = Counter::new("coporties.chat.send_failures");
pub(crate) static CHAT_SEND_DURATION: Moments =
    Moments::new("coporties.chat.send_duration_seconds");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);

    collector.register_counter(&STREAM_CHUNKS);
    collector.register_counter(&STREAM_ERRORS);
    collector.register_counter(&STREAM_BYTES);
    collector.register_moments(&STREAM_TTFB);

    collector.register_counter(&ATTACHMENTS_CAPTURED);
    collector.register_counter(&ATTACHMENTS_REJECTED);

    collector.register_counter(&CHAT_SENDS);
    collector.register_counter(&CHAT_SEND_FAILURES);
    collector.register_moments(&CHAT_SEND_DURATION);
}
