use booking_bot::bot::commands::Command;
use teloxide::utils::command::BotCommands;

#[cfg(test)]
mod command_parsing_tests {
    use super::*;

    #[test]
    fn test_user_commands_parsing() {
        assert_eq!(Command::parse("/help", "testbot").unwrap(), Command::Help);
        assert_eq!(Command::parse("/start", "testbot").unwrap(), Command::Start);
        assert_eq!(Command::parse("/cancel", "testbot").unwrap(), Command::Cancel);
    }

    #[test]
    fn test_admin_commands_parsing() {
        assert_eq!(
            Command::parse("/viewbookings", "testbot").unwrap(),
            Command::ViewBookings
        );
        assert_eq!(Command::parse("/clear", "testbot").unwrap(), Command::Clear);
    }

    #[test]
    fn test_delete_command_keeps_argument() {
        assert_eq!(
            Command::parse("/delete 42", "testbot").unwrap(),
            Command::Delete("42".to_string())
        );
        // Validation of the id happens in the admin console.
        assert_eq!(
            Command::parse("/delete abc", "testbot").unwrap(),
            Command::Delete("abc".to_string())
        );
    }

    #[test]
    fn test_command_with_bot_mention() {
        assert_eq!(Command::parse("/start@testbot", "testbot").unwrap(), Command::Start);
        assert_eq!(
            Command::parse("/delete@testbot 7", "testbot").unwrap(),
            Command::Delete("7".to_string())
        );
        assert!(Command::parse("/start@otherbot", "testbot").is_err());
    }

    #[test]
    fn test_invalid_command_parsing() {
        assert!(Command::parse("/invalid", "testbot").is_err());
        assert!(Command::parse("/schedule", "testbot").is_err());
        assert!(Command::parse("hello", "testbot").is_err());
    }

    #[test]
    fn test_descriptions_list_every_command() {
        let help = Command::descriptions().to_string();
        for command in ["/help", "/start", "/cancel", "/viewbookings", "/delete", "/clear"] {
            assert!(help.contains(command), "help text is missing {command}");
        }
    }
}
