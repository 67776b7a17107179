use biometrics::{Collector, Counter};

pub(crate) static LOGIN_REQUESTS: Counter = Counter::new("parley.client.logins");
pub(crate) static LOGIN_ERRORS: Counter = Counter::new("parley.client.login_errors");
pub(crate) static CHAT_REQUESTS: Counter = Counter::new("parley.client.chat_requests");
pub(crate) static CHAT_ERRORS: Counter = Counter::new("parley.client.chat_errors");

pub(crate) static SOCKET_CONNECTS: Counter = Counter::new("parley.socket.connects");
pub(crate) static SOCKET_FRAMES_OUT: Counter = Counter::new("parley.socket.frames_out");
pub(crate) static SOCKET_FRAMES_IN: Counter = Counter::new("parley.socket.frames_in");
pub(crate) static SOCKET_ERRORS: Counter = Counter::new("parley.socket.errors");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&LOGIN_REQUESTS);
    collector.register_counter(&LOGIN_ERRORS);
    collector.register_counter(&CHAT_REQUESTS);
    collector.register_counter(&CHAT_ERRORS);

    collector.register_counter(&SOCKET_CONNECTS);
    collector.register_counter(&SOCKET_FRAMES_OUT);
    collector.register_counter(&SOCKET_FRAMES_IN);
    collector.register_counter(&SOCKET_ERRORS);
}
