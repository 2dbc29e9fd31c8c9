use std::time::Duration;

/// Tuning knobs of a connection, with defaults for every value.
#[derive(Debug, Clone)]
pub struct ConnectionConfiguration {
    startup_timeout: Duration,
    request_timeout: Duration,
    events_queue_capacity: usize,
}

impl Default for ConnectionConfiguration {
    fn default() -> Self {
        Self {
            startup_timeout: Self::DEFAULT_STARTUP_TIMEOUT,
            request_timeout: Self::DEFAULT_REQUEST_TIMEOUT,
            events_queue_capacity: Self::DEFAULT_EVENTS_QUEUE_CAPACITY,
        }
    }
}

impl ConnectionConfiguration {
    /// Default value for the time within which connecting and negotiating
    /// must complete.
    pub const DEFAULT_STARTUP_TIMEOUT: Duration = Duration::from_secs(10);

    /// Default value for the time within which each call must complete.
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

    /// Default value for the capacity of the event queue.
    ///
    /// When the queue is full, further events are dropped until the
    /// subscriber catches up.
    pub const DEFAULT_EVENTS_QUEUE_CAPACITY: usize = 100;

    /// Returns the connection's startup timeout.
    #[must_use]
    pub fn startup_timeout(&self) -> Duration {
        self.startup_timeout
    }
    /// Sets the connection's startup timeout.
    pub fn set_startup_timeout(&mut self, startup_timeout: Duration) {
        self.startup_timeout = startup_timeout;
    }
    /// Builder-method for setting the connection's startup timeout.
    #[must_use]
    pub fn with_startup_timeout(mut self, startup_timeout: Duration) -> Self {
        self.startup_timeout = startup_timeout;
        self
    }

    /// Returns the connection's request timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
    /// Sets the connection's request timeout.
    pub fn set_request_timeout(&mut self, request_timeout: Duration) {
        self.request_timeout = request_timeout;
    }
    /// Builder-method for setting the connection's request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Returns the capacity of the event queue.
    #[must_use]
    pub fn events_queue_capacity(&self) -> usize {
        self.events_queue_capacity
    }
    /// Sets the capacity of the event queue.
    pub fn set_events_queue_capacity(&mut self, events_queue_capacity: usize) {
        self.events_queue_capacity = events_queue_capacity.max(1);
    }
    /// Builder-method for setting the capacity of the event queue.
    #[must_use]
    pub fn with_events_queue_capacity(mut self, events_queue_capacity: usize) -> Self {
        self.set_events_queue_capacity(events_queue_capacity);
        self
    }
}
