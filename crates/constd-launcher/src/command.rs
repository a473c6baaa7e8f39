// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 The constd Authors

//! Command rendering for the proxy tier and Runner launches, parameterized on
//! `exec_mode`. Pure and side-effect free, so it is unit-testable without
//! spawning anything — the Command Launcher (`launcher::Launcher`) consumes
//! the rendered string.

use constd_core::{ExecMode, Fqfn, SupervisorConfig};
use rand::Rng;

/// Choose a random port in `[10000, 20000)` for a function Runner instance.
pub fn random_port() -> u16 {
    rand::thread_rng().gen_range(10_000..20_000)
}

/// Render the shell command used to launch the proxy tier (`atmo`), along
/// with the port it will listen on.
pub fn render_atmo_command(config: &SupervisorConfig) -> String {
    match config.exec_mode {
        ExecMode::Docker => format!(
            "docker run --rm -p {port}:{port} -e ATMO_HTTP_PORT={port} \
             -e ATMO_CONTROL_PLANE={control_plane} --network bridge \
             suborbital/atmo-proxy:{tag} atmo-proxy",
            port = config.atmo_port,
            control_plane = config.control_plane,
            tag = config.atmo_version,
        ),
        ExecMode::Metal => "atmo-proxy".to_string(),
    }
}

/// Render the shell command used to launch one Runner instance for `fqfn`,
/// along with the port it will listen on.
pub fn render_sat_command(config: &SupervisorConfig, fqfn: &Fqfn, port: u16) -> String {
    match config.exec_mode {
        ExecMode::Docker => format!(
            "docker run --rm -p {port}:{port} -e SAT_HTTP_PORT={port} \
             -e SAT_CONTROL_PLANE={control_plane} --network bridge \
             suborbital/sat:{tag} sat {fqfn}",
            control_plane = config.control_plane,
            tag = config.sat_version,
        ),
        ExecMode::Metal => format!("sat {fqfn}"),
    }
}

#[cfg(test)]
mod tests {
    use constd_core::SupervisorConfig;

    use super::*;

    fn echo_fqfn() -> Fqfn {
        Fqfn::new("com.acme", "default", "echo", "v1")
    }

    #[test]
    fn docker_mode_renders_docker_run_with_port_mapping() {
        let config = SupervisorConfig { exec_mode: ExecMode::Docker, ..Default::default() };
        let cmd = render_sat_command(&config, &echo_fqfn(), 10234);
        assert!(cmd.contains("docker run"));
        assert!(cmd.contains("-p 10234:10234"));
        assert!(cmd.contains("com.acme#default::echo@v1"));
    }

    #[test]
    fn metal_mode_renders_bare_binary_invocation() {
        let config = SupervisorConfig { exec_mode: ExecMode::Metal, ..Default::default() };
        let cmd = render_sat_command(&config, &echo_fqfn(), 10234);
        assert_eq!(cmd, "sat com.acme#default::echo@v1");
    }

    #[test]
    fn docker_atmo_command_includes_control_plane() {
        let config = SupervisorConfig {
            exec_mode: ExecMode::Docker,
            control_plane: "cp.internal:9090".to_string(),
            ..Default::default()
        };
        let cmd = render_atmo_command(&config);
        assert!(cmd.contains("ATMO_CONTROL_PLANE=cp.internal:9090"));
    }

    #[test]
    fn metal_atmo_command_is_bare_binary() {
        let config = SupervisorConfig { exec_mode: ExecMode::Metal, ..Default::default() };
        assert_eq!(render_atmo_command(&config), "atmo-proxy");
    }

    #[test]
    fn random_port_is_within_bounds() {
        for _ in 0..1000 {
            let p = random_port();
            assert!((10_000..20_000).contains(&p));
        }
    }
}
