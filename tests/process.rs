//! Lifecycle actions and correlation against real child processes.
#![cfg(unix)]

use portwarden::process::{pause, resume, terminate};
use portwarden::types::Pid;
use std::process::{Child, Command};

fn spawn_sleeper() -> Child {
    Command::new("sleep").arg("30").spawn().unwrap()
}

#[test]
fn terminate_then_retry_fails() {
    let mut child = spawn_sleeper();
    let pid = Pid::new(child.id() as i32);

    let first = terminate(pid, true);
    assert!(first.success, "{}", first.message);
    assert_eq!(first.message, format!("Process {} killed", pid));

    child.wait().unwrap();

    let second = terminate(pid, true);
    assert!(!second.success);
    assert!(second.message.starts_with(&format!("Failed to terminate process {}", pid)));
}

#[test]
fn pause_and_resume_a_child() {
    let mut child = spawn_sleeper();
    let pid = Pid::new(child.id() as i32);

    assert!(pause(pid).success);
    assert!(resume(pid).success);
    // Resuming a running process is harmless.
    assert!(resume(pid).success);

    assert!(terminate(pid, false).success);
    child.wait().unwrap();
}

#[cfg(target_os = "linux")]
#[test]
fn vanished_process_is_not_found() {
    use portwarden::correlate::{ProcessTable, ProcfsProcesses};
    use portwarden::error::CorrelationError;

    let mut child = spawn_sleeper();
    let pid = Pid::new(child.id() as i32);

    let info = ProcfsProcesses.inspect(pid).unwrap();
    assert_eq!(info.pid, pid);
    assert_eq!(info.name.as_deref(), Some("sleep"));

    assert!(terminate(pid, true).success);
    child.wait().unwrap();

    assert_eq!(ProcfsProcesses.inspect(pid), Err(CorrelationError::NotFound));
}

#[cfg(target_os = "linux")]
const LISTENER_ENV: &str = "PORTWARDEN_TEST_LISTENER";

/// Body of the child spawned by `dead_listener_has_no_owner`. A no-op in a
/// normal test run.
#[cfg(target_os = "linux")]
#[test]
fn listener_child() {
    if std::env::var_os(LISTENER_ENV).is_none() {
        return;
    }
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    println!("LISTENING {}", listener.local_addr().unwrap().port());
    std::thread::sleep(std::time::Duration::from_secs(30));
}

/// Re-run this test binary as a child that binds a loopback port, and return
/// the child with that port.
#[cfg(target_os = "linux")]
fn spawn_listener() -> (Child, u16) {
    use std::io::{BufRead, BufReader};
    use std::process::Stdio;

    let mut child = Command::new(std::env::current_exe().unwrap())
        .args(["listener_child", "--exact", "--nocapture", "--test-threads=1", "-q"])
        .env(LISTENER_ENV, "1")
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();

    let stdout = child.stdout.take().unwrap();
    let port = BufReader::new(stdout)
        .lines()
        .map_while(Result::ok)
        .find_map(|line| line.strip_prefix("LISTENING ").map(|p| p.parse().unwrap()))
        .expect("child reported its port");
    (child, port)
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn dead_listener_has_no_owner() {
    use portwarden::correlate::{system_correlator, Correlator};
    use portwarden::scanner::{scan, ScanConfig};
    use portwarden::types::PortRange;

    let (mut child, port) = spawn_listener();
    let pid = Pid::new(child.id() as i32);
    let correlator = system_correlator();
    let range = PortRange::new(port, port).unwrap();

    let owner = correlator.correlate(port).expect("live listener has an owner");
    assert_eq!(owner.pid, pid);

    let live = scan(range, ScanConfig::default(), None).await;
    assert!(live.is_open(port));
    assert_eq!(live.process_for(port).map(|p| p.pid), Some(pid));

    assert!(terminate(pid, true).success);
    child.wait().unwrap();

    for _ in 0..3 {
        assert!(correlator.correlate(port).is_none());
    }
    let after = scan(range, ScanConfig::default(), None).await;
    assert!(!after.is_open(port));
    assert_eq!(after.total_scanned(), 1);
}
