use crate::storage::{ChatRecord, ChatSummary};
use colored::*;

pub fn print_header(text: &str) {
    println!("\n{}", text.bright_cyan().bold());
    println!("{}", "=".repeat(text.chars().count()).bright_cyan());
}

pub fn print_error(text: &str) {
    eprintln!("{}", text.red().bold());
}

pub fn print_info(text: &str) {
    println!("{}", text.blue());
}

pub fn print_summaries(chats: &[ChatSummary]) {
    if chats.is_empty() {
        print_info("No chats stored yet");
        return;
    }

    for chat in chats {
        println!(
            "{}  {}  {} ({} messages)",
            chat.id.dimmed(),
            display_timestamp(&chat.timestamp).yellow(),
            chat.title.bold(),
            chat.message_count
        );
    }
}

pub fn print_chat(chat: &ChatRecord) {
    print_header(&chat.title);
    print_info(&format!("{} - last written {}", chat.id, display_timestamp(&chat.timestamp)));
    println!();

    for message in &chat.messages {
        match (message.role(), message.content()) {
            (Some(role), Some(content)) => println!("{}: {}", role.yellow().bold(), content),
            _ => println!("{}", message.as_value()),
        }
    }
}

fn display_timestamp(timestamp: &str) -> &str {
    if timestamp.is_empty() {
        "unknown"
    } else {
        timestamp
    }
}
