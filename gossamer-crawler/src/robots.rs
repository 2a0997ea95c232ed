use std::time::Duration;

use reqwest::Client;
use texting_robots::{Robot, get_robots_url};
use tokio::time::sleep;
use tracing::{debug, info};
use url::Url;

/// Minimum wait between fetch attempts, applied to every request.
pub const DEFAULT_POLITENESS_DELAY: Duration = Duration::from_secs(1);

/// Robots.txt gate plus the blanket politeness delay.
///
/// Fail-open: when robots.txt cannot be fetched or parsed, the gate allows
/// everything. A site without a readable policy is treated as unrestricted,
/// not as off-limits.
pub struct RobotsGate {
    robot: Option<Robot>,
    delay: Duration,
}

impl RobotsGate {
    /// Builds the gate for the seed's origin by fetching its `/robots.txt`
    /// once. Any failure along the way produces a permissive gate.
    pub async fn discover(client: &Client, seed: &Url, user_agent: &str, delay: Duration) -> Self {
        let robot = fetch_rules(client, seed, user_agent).await;
        if robot.is_none() {
            info!("No usable robots.txt for {}, crawling unrestricted", seed);
        }
        Self { robot, delay }
    }

    /// Gate with no robots rules at all, only the delay.
    pub fn permissive(delay: Duration) -> Self {
        Self { robot: None, delay }
    }

    /// Whether the crawl may fetch this URL.
    pub fn allowed(&self, url: &str) -> bool {
        match &self.robot {
            Some(robot) => robot.allowed(url),
            None => true,
        }
    }

    pub fn is_permissive(&self) -> bool {
        self.robot.is_none()
    }

    /// The wait applied before each fetch: the configured delay, or the
    /// site's `Crawl-delay` when that asks for more patience.
    pub fn effective_delay(&self) -> Duration {
        let crawl_delay = self
            .robot
            .as_ref()
            .and_then(|robot| robot.delay)
            .map(Duration::from_secs_f32);
        match crawl_delay {
            Some(site) if site > self.delay => site,
            _ => self.delay,
        }
    }

    /// Sleeps the effective delay.
    pub async fn pause(&self) {
        let delay = self.effective_delay();
        if !delay.is_zero() {
            sleep(delay).await;
        }
    }
}

async fn fetch_rules(client: &Client, seed: &Url, user_agent: &str) -> Option<Robot> {
    let robots_url = get_robots_url(seed.as_str()).ok()?;
    debug!("Fetching {}", robots_url);
    let response = client.get(&robots_url).send().await.ok()?;
    if !response.status().is_success() {
        debug!("robots.txt not available ({})", response.status());
        return None;
    }
    let body = response.bytes().await.ok()?;
    Robot::new(user_agent, &body).ok()
}
