use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("aethermind.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter =
    Counter::new("aethermind.client.request_errors");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("aethermind.client.request_duration_seconds");

pub(crate) static STREAM_CHUNKS: Counter = Counter::new("aethermind.stream.chunks");
pub(crate) static STREAM_BYTES: Counter = Counter::new("aethermind.stream.bytes");
pub(crate) static STREAM_ABANDONED: Counter = Counter::new("aethermind.stream.abandoned");
pub(crate) static STREAM_TTFB: Moments = Moments::new("aethermind.stream.ttfb_seconds");
pub(crate) static STREAM_DURATION: Moments = Moments::new("aethermind.stream.duration_seconds");

pub(crate) static STORE_SENDS: Counter = Counter::new("aethermind.store.sends");
pub(crate) static STORE_SEND_ERRORS: Counter = Counter::new("aethermind.store.send_errors");
pub(crate) static STORE_RELOAD_ERRORS: Counter = Counter::new("aethermind.store.reload_errors");

pub(crate) static AUTH_LOGINS: Counter = Counter::new("aethermind.auth.logins");
pub(crate) static AUTH_LOGIN_FAILURES: Counter = Counter::new("aethermind.auth.login_failures");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_moments(&CLIENT_REQUEST_DURATION);

    collector.register_counter(&STREAM_CHUNKS);
    collector.register_counter(&STREAM_BYTES);
    collector.register_counter(&STREAM_ABANDONED);
    collector.register_moments(&STREAM_TTFB);
    collector.register_moments(&STREAM_DURATION);

    collector.register_counter(&STORE_SENDS);
    collector.register_counter(&STORE_SEND_ERRORS);
    collector.register_counter(&STORE_RELOAD_ERRORS);

    collector.register_counter(&AUTH_LOGINS);
    collector.register_counter(&AUTH_LOGIN_FAILURES);
}
