use clap::{Arg, ArgAction, Command};

pub fn build_cli() -> Command {
    Command::new("relia")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Manage reliability study projects")
        .long_about("Relia keeps track of your reliability study projects. Each invocation loads your project list from the configured backend, then runs the requested command against it.")
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only log errors")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("list")
                .about("List your projects, newest first")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Output in JSON format")
                        .action(ArgAction::SetTrue)
                )
        )
        .subcommand(
            Command::new("status")
                .about("Show the project count, current project and onboarding state")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Output in JSON format")
                        .action(ArgAction::SetTrue)
                )
        )
        .subcommand(
            Command::new("create")
                .about("Create a project and make it current")
                .arg(
                    Arg::new("name")
                        .help("Project name")
                        .required(true)
                        .index(1)
                )
                .arg(
                    Arg::new("description")
                        .long("description")
                        .short('d')
                        .help("What this study is about")
                )
                .arg(
                    Arg::new("source-file")
                        .long("source-file")
                        .help("Name of the uploaded file this project starts from")
                )
        )
        .subcommand(
            Command::new("delete")
                .about("Delete a project")
                .arg(
                    Arg::new("id")
                        .help("Id of the project to delete")
                        .required(true)
                        .index(1)
                )
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_build() {
        let app = build_cli();
        assert_eq!(app.get_name(), "relia");
    }

    #[test]
    fn test_cli_requires_subcommand() {
        let app = build_cli();
        let matches = app.try_get_matches_from(vec!["relia"]);
        assert!(matches.is_err());
    }

    #[test]
    fn test_cli_create_command() {
        let app = build_cli();
        let matches = app
            .try_get_matches_from(vec![
                "relia",
                "create",
                "Line A Study",
                "--description",
                "Conveyor drives",
                "--source-file",
                "line-a.xlsx",
            ])
            .unwrap();

        let create_matches = matches.subcommand_matches("create").unwrap();
        assert_eq!(
            create_matches.get_one::<String>("name").unwrap(),
            "Line A Study"
        );
        assert_eq!(
            create_matches.get_one::<String>("description").unwrap(),
            "Conveyor drives"
        );
        assert_eq!(
            create_matches.get_one::<String>("source-file").unwrap(),
            "line-a.xlsx"
        );
    }

    #[test]
    fn test_cli_create_requires_name() {
        let app = build_cli();
        let matches = app.try_get_matches_from(vec!["relia", "create"]);
        assert!(matches.is_err());
    }

    #[test]
    fn test_cli_list_json_flag() {
        let app = build_cli();
        let matches = app
            .try_get_matches_from(vec!["relia", "list", "--json"])
            .unwrap();

        let list_matches = matches.subcommand_matches("list").unwrap();
        assert!(list_matches.get_flag("json"));
    }

    #[test]
    fn test_cli_delete_requires_id() {
        let app = build_cli();
        assert!(
            app.try_get_matches_from(vec!["relia", "delete"])
                .is_err()
        );
    }

    #[test]
    fn test_cli_quiet_flag_is_global() {
        let app = build_cli();
        let matches = app
            .try_get_matches_from(vec!["relia", "status", "-q"])
            .unwrap();
        assert!(matches.get_flag("quiet"));
    }
}
