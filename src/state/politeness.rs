use std::time::{Duration, Instant};

/// Enforces a minimum interval between requests to one site
///
/// Every request to the site (robots.txt included) goes through
/// [`Politeness::wait`], so two requests are never closer than `delay`.
#[derive(Debug, Clone)]
pub struct Politeness {
    /// Minimum time between two requests
    delay: Duration,

    /// When the last request was started
    last_request_time: Option<Instant>,

    /// Number of requests made through this gate
    request_count: u32,
}

impl Politeness {
    /// Creates a gate with the given minimum interval
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_request_time: None,
            request_count: 0,
        }
    }

    /// Returns the current minimum interval
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Raises the interval to a robots.txt Crawl-delay (seconds), never lowers it
    pub fn apply_crawl_delay(&mut self, seconds: Option<f64>) {
        if let Some(seconds) = seconds.filter(|s| s.is_finite()) {
            let crawl_delay = Duration::from_secs_f64(seconds.clamp(0.0, 3600.0));
            if crawl_delay > self.delay {
                self.delay = crawl_delay;
            }
        }
    }

    /// Number of requests recorded so far
    pub fn request_count(&self) -> u32 {
        self.request_count
    }

    /// Calculates the time until the next request can be made
    ///
    /// Returns None if a request can be made now, or the duration to wait otherwise.
    pub fn time_until_next_request(&self, now: Instant) -> Option<Duration> {
        let last = self.last_request_time?;
        let elapsed = now.saturating_duration_since(last);
        if elapsed < self.delay {
            Some(self.delay - elapsed)
        } else {
            None
        }
    }

    /// Records that a request was made
    pub fn record_request(&mut self, now: Instant) {
        self.request_count += 1;
        self.last_request_time = Some(now);
    }

    /// Sleeps until a request is allowed, then records it
    pub async fn wait(&mut self) {
        if let Some(remaining) = self.time_until_next_request(Instant::now()) {
            tracing::trace!("Politeness wait of {:?}", remaining);
            tokio::time::sleep(remaining).await;
        }
        self.record_request(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_request_initially() {
        let gate = Politeness::new(Duration::from_millis(1000));
        assert!(gate.time_until_next_request(Instant::now()).is_none());
        assert_eq!(gate.request_count(), 0);
    }

    #[test]
    fn test_cannot_request_within_delay() {
        let mut gate = Politeness::new(Duration::from_millis(1000));
        let now = Instant::now();
        gate.record_request(now);

        assert!(gate
            .time_until_next_request(now + Duration::from_millis(500))
            .is_some());
        assert!(gate
            .time_until_next_request(now + Duration::from_millis(1000))
            .is_none());
    }

    #[test]
    fn test_time_until_next_request() {
        let mut gate = Politeness::new(Duration::from_millis(1000));
        let now = Instant::now();
        gate.record_request(now);

        let wait = gate
            .time_until_next_request(now + Duration::from_millis(400))
            .unwrap();
        assert_eq!(wait, Duration::from_millis(600));
    }

    #[test]
    fn test_crawl_delay_only_raises() {
        let mut gate = Politeness::new(Duration::from_millis(1000));
        gate.apply_crawl_delay(Some(0.5));
        assert_eq!(gate.delay(), Duration::from_millis(1000));

        gate.apply_crawl_delay(Some(2.0));
        assert_eq!(gate.delay(), Duration::from_secs(2));

        gate.apply_crawl_delay(None);
        assert_eq!(gate.delay(), Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_wait_spaces_requests() {
        let mut gate = Politeness::new(Duration::from_millis(50));
        let start = Instant::now();
        gate.wait().await;
        gate.wait().await;

        assert!(start.elapsed() >= Duration::from_millis(50));
        assert_eq!(gate.request_count(), 2);
    }
}
