use super::*;
use futures::StreamExt;

#[test]
fn test_builder_collects_args() {
    let command = ProcessCommandBuilder::new("ffmpeg")
        .arg("-re")
        .args(["-f", "flv"])
        .build();
    assert_eq!(command.program, "ffmpeg");
    assert_eq!(command.args, vec!["-re", "-f", "flv"]);
    assert_eq!(command.display(), "ffmpeg -re -f flv");
}

#[tokio::test]
async fn test_real_process_separates_streams() {
    let manager = SubprocessManager::production();
    let command = ProcessCommandBuilder::new("sh")
        .args(["-c", "echo out1; echo err1 >&2; echo out2; exit 3"])
        .build();

    let stream = manager.runner().run_streaming(command).await.unwrap();
    let stdout: Vec<String> = stream.stdout.map(|l| l.unwrap()).collect().await;
    let stderr: Vec<String> = stream.stderr.map(|l| l.unwrap()).collect().await;
    let status = stream.status.await.unwrap();

    assert_eq!(stdout, vec!["out1", "out2"]);
    assert_eq!(stderr, vec!["err1"]);
    assert_eq!(status, ExitStatus::Error(3));
    assert_eq!(status.code(), Some(3));
}

#[tokio::test]
async fn test_mock_scripted_output() {
    let (manager, mut mock) = SubprocessManager::mock();
    mock.expect_command("build")
        .stdout_line("compiling")
        .stderr_line("warning: unused")
        .exit_code(2)
        .finish();

    let command = ProcessCommandBuilder::new("build").build();
    let stream = manager.runner().run_streaming(command).await.unwrap();
    let stdout: Vec<String> = stream.stdout.map(|l| l.unwrap()).collect().await;
    let stderr: Vec<String> = stream.stderr.map(|l| l.unwrap()).collect().await;

    assert_eq!(stdout, vec!["compiling"]);
    assert_eq!(stderr, vec!["warning: unused"]);
    assert_eq!(stream.status.await.unwrap(), ExitStatus::Error(2));
    assert!(mock.verify_called("build", 1));
}

#[tokio::test]
async fn test_mock_unknown_program_is_not_found() {
    let (manager, _mock) = SubprocessManager::mock();
    let command = ProcessCommandBuilder::new("missing").build();
    let err = manager.runner().run_streaming(command).await.err().unwrap();
    assert!(err.is_spawn_failure());
}

#[tokio::test]
async fn test_mock_background_termination_is_tracked() {
    let (manager, mut mock) = SubprocessManager::mock();
    mock.expect_command("encoder").finish();

    let command = ProcessCommandBuilder::new("encoder").build();
    let mut handle = manager.runner().spawn_background(command).await.unwrap();
    assert_eq!(mock.running_background(), 1);

    handle.terminate().await.unwrap();
    assert_eq!(mock.running_background(), 0);
    assert!(handle.id().is_none());
}
