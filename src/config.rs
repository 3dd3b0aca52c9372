//! Compiled-in endpoint configuration for the three hops, each
//! overridable by environment variable. No configuration file is required
//! or read.

use std::env;

/// Selects the production UDP-multicast addresses or the loopback
/// development addresses. This crate implements a single `Socket`
/// (raw UDP, see `net::socket`), so "development" here means UDP unicast on
/// loopback rather than a second, TCP-based transport: standing up a
/// whole additional `Socket` impl just to exercise an unused wire protocol
/// would add a second thing to keep correct with no behavioural contract
/// riding on it. See `DESIGN.md` for the full rationale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Production,
    Development,
}

/// One hop's wire contract: the group tag RADIO attaches and DISH filters
/// on, plus the multicast (or loopback) address/port pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HopEndpoint {
    pub group: &'static str,
    pub addr: String,
    pub port: u16,
}

impl HopEndpoint {
    fn new(group: &'static str, addr: &str, port: u16) -> Self {
        Self {
            group,
            addr: addr.to_string(),
            port,
        }
    }

    /// Overrides `addr:port` from `env_var` if set, keeping the group tag
    /// fixed (the group tag is part of the wire contract, not a deployment
    /// knob).
    fn with_env_override(mut self, env_var: &str) -> Self {
        if let Ok(value) = env::var(env_var) {
            if let Some((addr, port)) = value.rsplit_once(':') {
                if let Ok(port) = port.parse() {
                    self.addr = addr.to_string();
                    self.port = port;
                }
            }
        }
        self
    }

    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.addr, self.port)
    }
}

/// Upstream of A: the raw 8 Hz track stream stage A consumes, group
/// `TrackData` at `239.1.1.1:9000` in production. The development port is
/// 14999 rather than 15000 so the two loopback sockets in a local run
/// don't fight over one port with the A→B hop below.
pub fn raw_track_endpoint(profile: Profile) -> HopEndpoint {
    let ep = match profile {
        Profile::Production => HopEndpoint::new("TrackData", "239.1.1.1", 9000),
        Profile::Development => HopEndpoint::new("TrackData", "127.0.0.1", 14999),
    };
    ep.with_env_override("TRACKPIPE_RAW_TRACK_ENDPOINT")
}

/// A→B: stage A's extrapolated track stream.
pub fn extrap_track_endpoint(profile: Profile) -> HopEndpoint {
    let ep = match profile {
        Profile::Production => HopEndpoint::new("ExtrapTrackData", "239.1.1.2", 9001),
        Profile::Development => HopEndpoint::new("ExtrapTrackData", "127.0.0.1", 15000),
    };
    ep.with_env_override("TRACKPIPE_STAGE_A_ENDPOINT")
}

/// B→C: stage B's delay-annotated stream.
pub fn delay_calc_endpoint(profile: Profile) -> HopEndpoint {
    let ep = match profile {
        Profile::Production => HopEndpoint::new("DelayCalcTrackData", "239.1.1.5", 9595),
        Profile::Development => HopEndpoint::new("DelayCalcTrackData", "127.0.0.1", 15002),
    };
    ep.with_env_override("TRACKPIPE_STAGE_B_ENDPOINT")
}

/// C→: stage C's final, fully annotated stream.
pub fn final_calc_endpoint(profile: Profile) -> HopEndpoint {
    let ep = match profile {
        Profile::Production => HopEndpoint::new("FinalCalcTrackData", "239.1.1.5", 9597),
        Profile::Development => HopEndpoint::new("FinalCalcTrackData", "127.0.0.1", 15003),
    };
    ep.with_env_override("TRACKPIPE_STAGE_C_ENDPOINT")
}

/// Input/output rates for stage A's extrapolator, overridable for
/// experimentation without a rebuild.
pub fn extrapolator_rates() -> (f64, f64) {
    let f_in = env::var("TRACKPIPE_INPUT_RATE_HZ")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(8.0);
    let f_out = env::var("TRACKPIPE_OUTPUT_RATE_HZ")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(100.0);
    (f_in, f_out)
}

/// Moving-average window size for stage C's analytics sink (default
/// `W = 100`).
pub fn moving_average_window() -> usize {
    env::var("TRACKPIPE_MOVING_AVERAGE_WINDOW")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn production_defaults_match_the_published_endpoint_table() {
        let a = extrap_track_endpoint(Profile::Production);
        assert_eq!(a.group, "ExtrapTrackData");
        assert_eq!(a.socket_addr(), "239.1.1.2:9001");

        let b = delay_calc_endpoint(Profile::Production);
        assert_eq!(b.group, "DelayCalcTrackData");
        assert_eq!(b.socket_addr(), "239.1.1.5:9595");

        let c = final_calc_endpoint(Profile::Production);
        assert_eq!(c.group, "FinalCalcTrackData");
        assert_eq!(c.socket_addr(), "239.1.1.5:9597");
    }

    #[test]
    fn development_defaults_use_loopback_ports() {
        assert_eq!(
            extrap_track_endpoint(Profile::Development).socket_addr(),
            "127.0.0.1:15000"
        );
        assert_eq!(
            delay_calc_endpoint(Profile::Development).socket_addr(),
            "127.0.0.1:15002"
        );
        assert_eq!(
            final_calc_endpoint(Profile::Development).socket_addr(),
            "127.0.0.1:15003"
        );
    }

    #[test]
    fn group_names_fit_the_16_byte_limit() {
        for group in ["ExtrapTrackData", "DelayCalcTrackData", "FinalCalcTrackData"] {
            assert!(group.len() <= 16, "{group} exceeds the 16-byte group tag limit");
        }
    }
}
