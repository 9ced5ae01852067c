use crossterm::style::Stylize;

pub struct CliDisplay;

impl CliDisplay {
    pub fn print_connected_message(server_addr: &str) {
        println!("Connected to cave at {}!", server_addr);
        println!("Commands: MOVE <room>, SHOOT <room>, PICKUP, CLIMB, QUIT");
    }

    pub fn print_senses(senses: &[String]) {
        println!();
        for sense in senses {
            println!("{}", sense);
        }
    }

    pub fn print_notifications(notifications: &[String]) {
        for notification in notifications {
            println!("{}", format!("* {}", notification).yellow());
        }
    }

    pub fn print_died() {
        println!("{}", "You died.".red().bold());
    }

    pub fn print_disconnected() {
        println!("Disconnected from the cave.");
    }
}
