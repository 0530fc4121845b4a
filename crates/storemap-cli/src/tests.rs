use super::*;

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["storemap-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn convert_defaults_to_unfiltered_stdout() {
    let cli = Cli::try_parse_from(["storemap-cli", "convert"]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Convert {
            input: None,
            output: None,
            ref brand,
            ref codes,
            pretty: false,
        }) if brand == "all" && codes == "all"
    ));
}

#[test]
fn convert_accepts_all_options() {
    let cli = Cli::try_parse_from([
        "storemap-cli",
        "convert",
        "--input",
        "data/stores.csv",
        "--output",
        "out.geojson",
        "--brand",
        "松屋",
        "--codes",
        "limited.csv",
        "--pretty",
    ])
    .expect("expected valid cli args");

    match cli.command {
        Some(Commands::Convert {
            input,
            output,
            brand,
            codes,
            pretty,
        }) => {
            assert_eq!(input, Some(PathBuf::from("data/stores.csv")));
            assert_eq!(output, Some(PathBuf::from("out.geojson")));
            assert_eq!(brand, "松屋");
            assert_eq!(codes, "limited.csv");
            assert!(pretty);
        }
        other => panic!("expected convert command, got {other:?}"),
    }
}

#[test]
fn parses_brands_with_input() {
    let cli = Cli::try_parse_from(["storemap-cli", "brands", "--input", "stores.csv"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Brands { input: Some(ref p) }) if p == &PathBuf::from("stores.csv")
    ));
}

#[test]
fn parses_state_show_and_clear() {
    let show = Cli::try_parse_from(["storemap-cli", "state", "show"]).expect("valid");
    assert!(matches!(
        show.command,
        Some(Commands::State {
            command: StateCommands::Show
        })
    ));

    let clear = Cli::try_parse_from(["storemap-cli", "state", "clear"]).expect("valid");
    assert!(matches!(
        clear.command,
        Some(Commands::State {
            command: StateCommands::Clear
        })
    ));
}

#[test]
fn state_requires_a_subcommand() {
    assert!(Cli::try_parse_from(["storemap-cli", "state"]).is_err());
}

#[test]
fn unknown_convert_flag_is_rejected() {
    assert!(Cli::try_parse_from(["storemap-cli", "convert", "--jitter", "1"]).is_err());
}
