use juju_charm_examples::charms::hook_printer;
use juju_charm_examples::core::env::Invocation;

fn context(hook: &str) -> Invocation {
    Invocation::new([
        ("JUJU_HOOK_NAME", hook),
        ("JUJU_UNIT_NAME", "printer/3"),
        ("JUJU_MODEL_NAME", "demo"),
        ("JUJU_MODEL_UUID", "6f1c7a3e-0000-4000-8000-000000000001"),
        ("JUJU_VERSION", "3.4.2"),
    ])
}

fn render(inv: &Invocation) -> String {
    let mut out = Vec::new();
    hook_printer::run(inv, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn install_runs_the_custom_handler_first() {
    let out = render(&context("install"));
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "Custom on_install hook");
    assert!(lines[1].starts_with("Hello Juju: install on printer/3 ("));
}

#[test]
fn other_hooks_only_greet() {
    let out = render(&context("update-status"));
    assert!(!out.contains("Custom on_install hook"));
    assert!(out.starts_with("Hello Juju: update-status on printer/3 ("));
    assert!(out.contains("demo"));
}

#[test]
fn missing_context_dumps_environment_and_arguments() {
    let inv = Invocation::new([("JUJU_HOOK_NAME", "install"), ("PATH", "/usr/bin")])
        .with_args(vec!["hooks/install".to_string(), "extra".to_string()]);

    let out = render(&inv);

    let first = out.lines().next().unwrap();
    assert!(first.starts_with("Hello Juju: invalid Juju context"));
    assert!(!out.contains("Custom on_install hook"));
    assert!(out.contains("  env JUJU_HOOK_NAME=install\n"));
    assert!(out.contains("  env PATH=/usr/bin\n"));
    assert!(out.contains("  argv[0]=hooks/install\n"));
    assert!(out.contains("  argv[1]=extra\n"));
}

#[test]
fn context_without_event_is_reported() {
    let inv = Invocation::new([
        ("JUJU_UNIT_NAME", "printer/0"),
        ("JUJU_MODEL_NAME", "demo"),
        ("JUJU_MODEL_UUID", "6f1c7a3e-0000-4000-8000-000000000001"),
        ("JUJU_VERSION", "3.4.2"),
    ]);

    let out = render(&inv);

    assert!(out.starts_with("Hello Juju: Juju context present but hook context absent"));
    assert!(out.contains("  env JUJU_UNIT_NAME=printer/0\n"));
}
