#[cfg(test)]
mod tests {
    use crate::cli::validation::{parse_debounce_ms, parse_dir_name, parse_port};
    use crate::cli::Cli;
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn test_parse_port_valid() {
        assert_eq!(parse_port("8080"), Ok(8080));
        assert_eq!(parse_port("0"), Ok(0));
        assert_eq!(parse_port("65535"), Ok(65535));
    }

    #[test]
    fn test_parse_port_invalid() {
        assert!(parse_port("").is_err());
        assert!(parse_port("-1").is_err());
        assert!(parse_port("80a").is_err());

        let err = parse_port("70000").unwrap_err();
        assert!(err.contains("out of range"));
    }

    #[test]
    fn test_parse_dir_name() {
        assert_eq!(parse_dir_name("dist"), Ok("dist".to_string()));
        assert_eq!(parse_dir_name(".cache"), Ok(".cache".to_string()));

        assert!(parse_dir_name("").is_err());
        assert!(parse_dir_name("build/out").is_err());
        assert!(parse_dir_name("build\\out").is_err());
        assert!(parse_dir_name("..").is_err());
    }

    #[test]
    fn test_parse_debounce_ms() {
        assert_eq!(parse_debounce_ms("250"), Ok(250));
        assert!(parse_debounce_ms("0").is_err());
        assert!(parse_debounce_ms("fast").is_err());
    }

    #[test]
    fn test_minimal_invocation() {
        let cli = Cli::try_parse_from(["livedir", "public"]).unwrap();

        assert_eq!(cli.serve.dir, PathBuf::from("public"));
        assert_eq!(cli.serve.port, None);
        assert!(!cli.serve.expose);
        assert!(!cli.serve.reload);
        assert!(cli.serve.ignore.is_empty());
        assert_eq!(cli.serve.debounce_ms, None);
        assert!(!cli.verbose);
        assert!(!cli.quiet);
    }

    #[test]
    fn test_all_flags() {
        let cli = Cli::try_parse_from([
            "livedir",
            "--port",
            "3000",
            "--expose",
            "--reload",
            "--ignore",
            "dist",
            "--ignore",
            "target",
            "--debounce-ms",
            "250",
            "--config",
            "livedir.json",
            "--verbose",
            "--no-color",
            "site",
        ])
        .unwrap();

        assert_eq!(cli.serve.port, Some(3000));
        assert!(cli.serve.expose);
        assert!(cli.serve.reload);
        assert_eq!(cli.serve.ignore, vec!["dist", "target"]);
        assert_eq!(cli.serve.debounce_ms, Some(250));
        assert_eq!(cli.serve.config, Some(PathBuf::from("livedir.json")));
        assert!(cli.verbose);
        assert!(cli.no_color);
        assert_eq!(cli.serve.dir, PathBuf::from("site"));
    }

    #[test]
    fn test_directory_is_required() {
        assert!(Cli::try_parse_from(["livedir", "--reload"]).is_err());
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["livedir", "-v", "-q", "site"]).is_err());
    }

    #[test]
    fn test_bad_port_is_rejected() {
        assert!(Cli::try_parse_from(["livedir", "--port", "http", "site"]).is_err());
    }

    #[test]
    fn test_ignore_path_is_rejected() {
        assert!(Cli::try_parse_from(["livedir", "--ignore", "a/b", "site"]).is_err());
    }
}
