use elmland::command::Command;

type Cmd = Command<u32, &'static str>;

fn describe(command: Cmd) -> Vec<String> {
    command
        .into_steps()
        .into_iter()
        .map(|step| match step {
            Command::None => "none".to_string(),
            Command::Message(n) => format!("msg:{n}"),
            Command::Effect(_) => "effect".to_string(),
            Command::Shared(s) => format!("shared:{s}"),
            Command::Navigate(to) => format!("nav:{to}"),
            Command::Batch(_) => "batch".to_string(),
        })
        .collect()
}

#[test]
fn batch_flattens_and_drops_none() {
    let command: Cmd = Command::batch([
        Command::none(),
        Command::of_msg(1),
        Command::batch([Command::from_shared("a"), Command::none(), Command::navigate("/x")]),
        Command::batch([]),
        Command::of_msg(2),
    ]);

    assert!(matches!(command, Command::Batch(ref steps) if steps.len() == 4));
    assert_eq!(describe(command), vec!["msg:1", "shared:a", "nav:/x", "msg:2"]);
}

#[test]
fn batch_of_one_is_that_command() {
    let command: Cmd = Command::batch([Command::none(), Command::of_msg(7)]);
    assert!(matches!(command, Command::Message(7)));
}

#[test]
fn empty_batches_are_none() {
    let command: Cmd = Command::batch([Command::batch([]), Command::none()]);
    assert!(command.is_none());
    assert!(matches!(command, Command::None));
    assert!(Cmd::default().is_none());
}

#[test]
fn map_changes_local_messages_only() {
    let command: Cmd = Command::batch([
        Command::of_msg(3),
        Command::from_shared("keep"),
        Command::navigate("/y"),
    ]);

    let mapped: Command<String, &'static str> = command.map(|n| format!("n={n}"));

    let steps: Vec<String> = mapped
        .into_steps()
        .into_iter()
        .map(|step| match step {
            Command::Message(m) => m,
            Command::Shared(s) => format!("shared:{s}"),
            Command::Navigate(to) => format!("nav:{to}"),
            _ => "other".to_string(),
        })
        .collect();
    assert_eq!(steps, vec!["n=3", "shared:keep", "nav:/y"]);
}

#[tokio::test]
async fn effect_maps_success_and_failure_to_messages() {
    let ok: Command<Result<u32, String>, ()> =
        Command::from_effect(async { Ok::<u32, String>(5) }, |result| result);
    let failed: Command<Result<u32, String>, ()> =
        Command::from_effect(async { Err::<u32, String>("down".to_string()) }, |result| result);

    let Command::Effect(ok) = ok else {
        panic!("expected effect")
    };
    let Command::Effect(failed) = failed else {
        panic!("expected effect")
    };

    assert_eq!(ok.into_future().await, Ok(5));
    assert_eq!(failed.into_future().await, Err("down".to_string()));
}

#[tokio::test]
async fn mapped_effect_result_is_mapped() {
    let command: Cmd = Command::perform(async { 20 }, |n: u32| n + 1);
    let Command::Effect(effect) = command.map(|n| n * 2) else {
        panic!("expected effect")
    };
    assert_eq!(effect.into_future().await, 42);
}
