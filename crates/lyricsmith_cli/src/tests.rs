use super::remote::{api_url, error_message_for_response, normalize_server, RemoteClient};
use super::*;
use lyricsmith_core::render_plain;
use reqwest::StatusCode;
use tempfile::TempDir;

fn setup_context(user_id: Option<&str>) -> (Context, TempDir) {
    let temp_dir = TempDir::new().expect("temp dir");
    let db_path = temp_dir.path().join("songs.redb");
    let db = Database::new(db_path.to_str().expect("utf-8 path")).expect("open db");
    let ctx = Context {
        db,
        user_id: user_id.map(str::to_string),
        json: false,
    };
    (ctx, temp_dir)
}

fn parse(args: &[&str]) -> Cli {
    let mut argv = vec!["lyrics"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).expect("parse")
}

fn run(ctx: &Context, args: &[&str]) -> Result<String, AppError> {
    run_local(ctx, parse(args).command)
}

#[test]
fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn global_flags_parse_after_subcommand() {
    let cli = parse(&["list", "--json", "--db", "/tmp/x.redb", "--user", "u1"]);
    assert!(cli.json);
    assert_eq!(cli.db.as_deref(), Some("/tmp/x.redb"));
    assert_eq!(cli.user.as_deref(), Some("u1"));
    assert_eq!(cli.timeout, 30);
}

#[test]
fn chord_accepts_negative_column_for_validation_downstream() {
    let cli = parse(&["chord", "Song", "3", "C", "-1"]);
    match cli.command {
        Commands::Chord { line, column, .. } => {
            assert_eq!(line, ItemId(3));
            assert_eq!(column, -1);
        }
        other => panic!("unexpected command: {:?}", other),
    }
}

#[test]
fn item_ids_must_be_numeric() {
    let result = Cli::try_parse_from(["lyrics", "remove", "Song", "abc"]);
    assert!(result.is_err());
}

#[test]
fn remote_commands_are_classified() {
    assert!(parse(&["push", "Song"]).command.is_remote());
    assert!(parse(&["remote-list"]).command.is_remote());
    assert!(!parse(&["show", "Song"]).command.is_remote());
}

#[test]
fn api_url_appends_segments_and_encodes() {
    let url = api_url("http://127.0.0.1:3055/", &["api", "songs", "user one", "s/1"]).unwrap();
    assert_eq!(
        url.as_str(),
        "http://127.0.0.1:3055/api/songs/user%20one/s%2F1"
    );
    assert!(api_url("not a url", &["api"]).is_err());
}

#[test]
fn normalize_server_prefers_loopback_and_strips_slashes() {
    assert_eq!(
        normalize_server(" http://localhost:3055/ "),
        "http://127.0.0.1:3055"
    );
    assert_eq!(
        normalize_server("https://songs.example.com//"),
        "https://songs.example.com"
    );
}

#[test]
fn error_message_prefers_json_error_field() {
    let message = error_message_for_response(
        StatusCode::BAD_REQUEST,
        r#"{"error":"userId is required"}"#,
    );
    assert_eq!(message, "userId is required");
    assert_eq!(
        error_message_for_response(StatusCode::NOT_FOUND, ""),
        "Not Found"
    );
    assert_eq!(
        error_message_for_response(StatusCode::BAD_GATEWAY, "upstream down"),
        "upstream down"
    );
}

#[test]
fn new_song_with_name_then_duplicate_is_rejected() {
    let (ctx, _dir) = setup_context(Some("u1"));
    let output = run(&ctx, &["new", "--name", "Road Song"]).unwrap();
    assert_eq!(output, "Created: Road Song");

    let err = run(&ctx, &["new", "--name", " Road Song "]).unwrap_err();
    assert!(matches!(err, AppError::ValidationFailed(_)));

    let stored = ctx.db.library.get("Road Song").unwrap().unwrap();
    assert_eq!(stored.user_id.as_deref(), Some("u1"));
}

#[test]
fn new_song_without_name_gets_generated_name() {
    let (ctx, _dir) = setup_context(None);
    let output = run(&ctx, &["new"]).unwrap();
    let name = output.strip_prefix("Created: ").unwrap();
    assert!(name.contains('-'));
    assert!(ctx.db.library.get(name).unwrap().is_some());
}

#[test]
fn editing_commands_build_a_song() {
    let (ctx, _dir) = setup_context(None);
    run(&ctx, &["new", "--name", "Draft"]).unwrap();

    let section = run(&ctx, &["add-section", "Draft", "Chorus"]).unwrap();
    assert_eq!(section, "Added section 1");
    run(&ctx, &["add-line", "Draft", "La la"]).unwrap();
    run(&ctx, &["chord", "Draft", "2", "C", "0"]).unwrap();
    run(&ctx, &["chord", "Draft", "2", "G", "3"]).unwrap();

    let rendered = run(&ctx, &["show", "Draft"]).unwrap();
    assert_eq!(rendered, "CHORUS\n\nC  G\nLa la");

    run(&ctx, &["unchord", "Draft", "2", "3"]).unwrap();
    run(&ctx, &["edit-line", "Draft", "2", "Hey hey"]).unwrap();
    run(&ctx, &["edit-section", "Draft", "1", "Verse"]).unwrap();
    let rendered = run(&ctx, &["show", "Draft"]).unwrap();
    assert_eq!(rendered, "VERSE\n\nC\nHey hey");
}

#[test]
fn add_line_after_and_move_change_order() {
    let (ctx, _dir) = setup_context(None);
    run(&ctx, &["new", "--name", "Order"]).unwrap();
    run(&ctx, &["add-line", "Order", "one"]).unwrap();
    run(&ctx, &["add-line", "Order", "three"]).unwrap();
    run(&ctx, &["add-line", "Order", "two", "--after", "1"]).unwrap();
    assert_eq!(run(&ctx, &["show", "Order", "--plain"]).unwrap(), "one\ntwo\nthree");

    run(&ctx, &["move", "Order", "1"]).unwrap();
    assert_eq!(run(&ctx, &["show", "Order", "--plain"]).unwrap(), "two\nthree\none");

    run(&ctx, &["move", "Order", "1", "--before", "3"]).unwrap();
    assert_eq!(run(&ctx, &["show", "Order", "--plain"]).unwrap(), "one\ntwo\nthree");
}

#[test]
fn failed_edit_leaves_saved_song_untouched() {
    let (ctx, _dir) = setup_context(None);
    run(&ctx, &["sample"]).unwrap();
    let before = ctx.db.library.get(SAMPLE_SONG_NAME).unwrap().unwrap();

    let err = run(&ctx, &["chord", SAMPLE_SONG_NAME, "1", "C", "0"]).unwrap_err();
    assert!(matches!(err, AppError::InvalidArgument(_)));
    let err = run(&ctx, &["chord", SAMPLE_SONG_NAME, "2", "C", "-4"]).unwrap_err();
    assert!(matches!(err, AppError::InvalidArgument(_)));
    let err = run(&ctx, &["remove", SAMPLE_SONG_NAME, "999"]).unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let after = ctx.db.library.get(SAMPLE_SONG_NAME).unwrap().unwrap();
    assert_eq!(after, before);
}

#[test]
fn empty_song_shows_placeholder_but_plain_is_empty() {
    let (ctx, _dir) = setup_context(None);
    run(&ctx, &["new", "--name", "Blank"]).unwrap();
    let display = run(&ctx, &["show", "Blank"]).unwrap();
    assert!(!display.is_empty());
    assert_eq!(run(&ctx, &["show", "Blank", "--plain"]).unwrap(), "");
}

#[test]
fn items_lists_ids_kinds_and_chords() {
    let (ctx, _dir) = setup_context(None);
    run(&ctx, &["sample"]).unwrap();
    let listing = run(&ctx, &["items", SAMPLE_SONG_NAME]).unwrap();
    let first: Vec<&str> = listing.lines().take(2).collect();
    assert_eq!(first[0], "   1  section  Verse 1");
    assert_eq!(
        first[1],
        "   2  line     Streetlights hum a quiet tune  [C@0, G@18]"
    );
}

#[test]
fn list_and_remove_report_library_state() {
    let (ctx, _dir) = setup_context(None);
    assert_eq!(run(&ctx, &["list"]).unwrap(), "No saved songs");

    run(&ctx, &["sample"]).unwrap();
    let listing = run(&ctx, &["list"]).unwrap();
    assert!(listing.starts_with(SAMPLE_SONG_NAME));
    assert!(listing.contains("4 lines"));

    let removed = run(&ctx, &["remove", SAMPLE_SONG_NAME, "1"]).unwrap();
    assert_eq!(removed, "Removed section 1");
    let rendered = run(&ctx, &["show", SAMPLE_SONG_NAME, "--plain"]).unwrap();
    assert!(!rendered.starts_with("VERSE 1"));
}

#[test]
fn rename_moves_the_library_key() {
    let (ctx, _dir) = setup_context(None);
    run(&ctx, &["new", "--name", "Old"]).unwrap();
    run(&ctx, &["new", "--name", "Taken"]).unwrap();

    let err = run(&ctx, &["rename", "Old", "Taken"]).unwrap_err();
    assert!(matches!(err, AppError::ValidationFailed(_)));

    run(&ctx, &["rename", "Old", "New"]).unwrap();
    assert!(ctx.db.library.get("Old").unwrap().is_none());
    assert_eq!(ctx.db.library.get("New").unwrap().unwrap().name, "New");
}

#[test]
fn delete_unknown_song_is_not_found() {
    let (ctx, _dir) = setup_context(None);
    let err = run(&ctx, &["delete", "Ghost"]).unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    run(&ctx, &["new", "--name", "Ghost"]).unwrap();
    assert_eq!(run(&ctx, &["delete", "Ghost"]).unwrap(), "Deleted: Ghost");
}

#[test]
fn export_then_import_under_new_name() {
    let (ctx, dir) = setup_context(None);
    run(&ctx, &["sample"]).unwrap();
    let path = dir.path().join("song.json");
    let path = path.to_str().unwrap();
    run(&ctx, &["export", SAMPLE_SONG_NAME, path]).unwrap();

    let output = run(&ctx, &["import", path, "--name", "Copy"]).unwrap();
    assert_eq!(output, "Imported: Copy");
    let original = ctx.db.library.get(SAMPLE_SONG_NAME).unwrap().unwrap();
    let copy = ctx.db.library.get("Copy").unwrap().unwrap();
    assert_eq!(render_plain(&copy), render_plain(&original));
    assert!(std::fs::read_to_string(path).unwrap().contains("exportedAt"));
    assert!(copy.exported_at.is_none());
}

#[test]
fn import_of_unnamed_document_derives_name_from_lyrics() {
    let (ctx, dir) = setup_context(None);
    let path = dir.path().join("legacy.json");
    std::fs::write(
        &path,
        r#"{"name": "", "lines": [{"id": 1, "text": "  Hello, darkness!  "}]}"#,
    )
    .unwrap();

    let output = run(&ctx, &["import", path.to_str().unwrap()]).unwrap();
    assert_eq!(output, "Imported: Hello, darkness");
}

#[test]
fn import_of_malformed_file_saves_nothing() {
    let (ctx, dir) = setup_context(None);
    let path = dir.path().join("bad.json");
    std::fs::write(&path, "{ not json").unwrap();

    let err = run(&ctx, &["import", path.to_str().unwrap()]).unwrap_err();
    assert!(matches!(err, AppError::MalformedInput(_)));
    assert!(ctx.db.library.list().unwrap().is_empty());
}

#[test]
fn text_export_writes_plain_rendering() {
    let (ctx, dir) = setup_context(None);
    run(&ctx, &["sample"]).unwrap();
    let path = dir.path().join("song.txt");
    run(
        &ctx,
        &["export", SAMPLE_SONG_NAME, path.to_str().unwrap(), "--text"],
    )
    .unwrap();
    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.starts_with("VERSE 1\n\nC"));
}

#[tokio::test(flavor = "multi_thread")]
async fn push_pull_and_delete_against_live_server() {
    let server_dir = TempDir::new().expect("temp dir");
    let config = lyricsmith_server::Config::for_db_path(
        server_dir.path().join("server.redb").to_str().unwrap(),
    );
    let server_db = lyricsmith_server::Database::new(&config.db_path).expect("server db");
    let state = lyricsmith_server::AppState::new(config, server_db);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let handle = tokio::spawn(lyricsmith_server::serve_router(
        listener,
        state,
        false,
        async move {
            let _ = stop_rx.await;
        },
    ));

    let (ctx, _dir) = setup_context(Some("user-1"));
    let client =
        RemoteClient::new(&format!("http://{}", addr), Duration::from_secs(10)).unwrap();
    run(&ctx, &["sample"]).unwrap();

    let pushed = run_remote(&ctx, &client, parse(&["push", SAMPLE_SONG_NAME]).command)
        .await
        .unwrap();
    assert!(pushed.starts_with("Pushed: Sample Song"));

    let listed = client.list("user-1").await.unwrap();
    assert_eq!(listed.len(), 1);
    let song_id = listed[0].song_id.clone();
    assert!(client.list("user-2").await.unwrap().is_empty());

    run_remote(
        &ctx,
        &client,
        parse(&["pull", &song_id, "--name", "Pulled"]).command,
    )
    .await
    .unwrap();
    let original = ctx.db.library.get(SAMPLE_SONG_NAME).unwrap().unwrap();
    let pulled = ctx.db.library.get("Pulled").unwrap().unwrap();
    assert_eq!(render_plain(&pulled), render_plain(&original));

    let missing = run_remote(&ctx, &client, parse(&["pull", "nope"]).command)
        .await
        .unwrap_err();
    assert!(matches!(missing, AppError::NotFound(_)));

    run_remote(&ctx, &client, parse(&["remote-delete", &song_id]).command)
        .await
        .unwrap();
    let listing = run_remote(&ctx, &client, parse(&["remote-list"]).command)
        .await
        .unwrap();
    assert_eq!(listing, "No remote songs");

    let _ = stop_tx.send(());
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn remote_failures_keep_local_copy() {
    let (ctx, _dir) = setup_context(Some("user-1"));
    run(&ctx, &["sample"]).unwrap();
    let before = ctx.db.library.get(SAMPLE_SONG_NAME).unwrap().unwrap();

    let client = RemoteClient::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
    let err = run_remote(&ctx, &client, parse(&["push", SAMPLE_SONG_NAME]).command)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::RemoteFailure(_)));
    assert_eq!(ctx.db.library.get(SAMPLE_SONG_NAME).unwrap().unwrap(), before);
}

#[tokio::test]
async fn remote_list_requires_a_user() {
    let (ctx, _dir) = setup_context(None);
    let client = RemoteClient::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
    let err = run_remote(&ctx, &client, parse(&["remote-list"]).command)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationFailed(_)));
}
