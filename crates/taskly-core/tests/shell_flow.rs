use std::io::Cursor;

use taskly_core::commands::{Shell, ShellCommand};
use taskly_core::navigation::Route;
use taskly_core::render::Renderer;
use taskly_core::screens::SlideConfig;
use taskly_core::state::AppState;
use taskly_core::task::TaskId;
use taskly_core::theme::ThemeMode;

fn shell() -> (taskly_core::state::SharedState, Shell<Vec<u8>>) {
    let state = AppState::shared(ThemeMode::Light);
    let shell = Shell::new(state.clone(), SlideConfig::default(), Renderer::plain(), Vec::new());
    (state, shell)
}

#[test]
fn scripted_session_drives_both_views() {
    let (state, mut shell) = shell();
    let script = "\
add Buy milk
add Walk dog
add
done 1
completed
add not here
rm 1
back
edit 2
type 2 Walk the dog
save 2
settings
theme dark
export
quit
add never reached
";
    shell.run(Cursor::new(script), None).expect("shell run");

    assert_eq!(shell.route(), Route::Tasks);
    let out = String::from_utf8(shell.into_output()).expect("utf8");
    assert!(out.contains("Task cannot be empty. Please enter a valid task."));
    assert!(out.contains("Completed Tasks"));
    assert!(out.contains("not available on Completed Tasks"));
    assert!(out.contains("No completed tasks yet!"));
    assert!(out.contains("\"theme\": \"dark\""));

    let store = state.store();
    assert!(store.completed().is_empty());
    assert_eq!(store.active().len(), 1);
    assert_eq!(store.active()[0].title, "Walk the dog");
    assert!(!store.active()[0].is_editing);
    assert!(state.is_dark_mode());
}

#[test]
fn blank_edit_submission_keeps_edit_mode() {
    let (state, mut shell) = shell();
    for line in ["add Buy milk", "edit 1", "type 1   ", "blur 1"] {
        let command = ShellCommand::parse(line).expect("parse").expect("command");
        shell.execute(command).expect("execute");
    }

    let store = state.store();
    let task = store.get_active(TaskId(1)).expect("task");
    assert_eq!(task.title, "Buy milk");
    assert!(task.is_editing);
}

#[test]
fn bad_lines_do_not_stop_the_shell() {
    let (state, mut shell) = shell();
    shell
        .run(Cursor::new("bogus\nrm\nadd still works\n"), None)
        .expect("shell run");

    let out = String::from_utf8(shell.into_output()).expect("utf8");
    assert!(out.contains("error: unknown or ambiguous command: bogus"));
    assert!(out.contains("error: rm needs a task id"));
    assert_eq!(state.store().active().len(), 1);
}

#[test]
fn search_filters_rendered_list() {
    let (_state, mut shell) = shell();
    shell
        .run(
            Cursor::new("add buy tax forms\nadd Walk dog\nsearch TAX\n"),
            None,
        )
        .expect("shell run");

    let out = String::from_utf8(shell.into_output()).expect("utf8");
    let last_view = out.rsplit("Taskly").next().expect("view");
    assert!(last_view.contains("search: TAX"));
    assert!(last_view.contains("buy tax forms"));
    assert!(!last_view.contains("Walk dog"));
}

#[test]
fn search_query_keeps_surrounding_spaces() {
    let (_state, mut shell) = shell();
    shell
        .run(
            Cursor::new("add tax forms\nadd taxes\nsearch tax \n"),
            None,
        )
        .expect("shell run");

    let out = String::from_utf8(shell.into_output()).expect("utf8");
    let last_view = out.rsplit("Taskly").next().expect("view");
    assert!(last_view.contains("tax forms"));
    assert!(!last_view.contains("taxes"));
}

#[test]
fn light_and_dark_need_the_settings_menu() {
    let (state, mut shell) = shell();
    shell
        .run(Cursor::new("theme dark\n"), None)
        .expect("shell run");
    assert!(!state.is_dark_mode());

    shell
        .run(Cursor::new("settings\ntheme dark\ntheme toggle\ntheme toggle\n"), None)
        .expect("shell run");
    assert!(state.is_dark_mode());

    let out = String::from_utf8(shell.into_output()).expect("utf8");
    assert!(out.contains("Light Mode and Dark Mode are in the settings menu"));
    assert!(out.contains("[ ] Light Mode  [*] Dark Mode"));
}
