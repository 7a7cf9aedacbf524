use shelfwise_shared::events::ChatEvent;
use shelfwise_shared::{Message, Role};
use crate::client::ApiClient;
use anyhow::Result;
use std::io::{self, Write};

/// Ask one question and print the answer.
pub async fn single_message(client: ApiClient, message: String) -> Result<()> {
    match client.chat(&[], &message).await {
        Ok(response) => {
            for msg in response.messages.iter().filter(|m| m.role == Role::Tool) {
                println!("   ✓ {}", first_line(msg.content.as_deref().unwrap_or("")));
            }
            println!("{}", response.content);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
        }
    }
    Ok(())
}

pub async fn interactive_chat(client: ApiClient) -> Result<()> {
    println!("Shelfwise chat started. Type 'quit' to exit.\n");

    let mut history: Vec<Message> = match client.greeting().await {
        Ok(seed) => seed,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Is the Shelfwise server running?");
            return Err(e);
        }
    };

    for greeting in &history {
        if let Some(content) = &greeting.content {
            println!("Shelfwise: {}\n", content);
        }
    }

    loop {
        print!("You: ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if input.eq_ignore_ascii_case("quit") {
            println!("Goodbye!");
            break;
        }

        if input.is_empty() {
            continue;
        }

        println!(); // Blank line before response

        match client.chat_stream(&history, input, handle_event).await {
            Ok(appended) => {
                history.extend(appended);
                println!(); // Blank line after response
            }
            Err(e) => {
                eprintln!("Error: {}\n", e);
            }
        }
    }

    Ok(())
}

fn handle_event(event: &ChatEvent) {
    match event {
        ChatEvent::ToolCall { tool, args, .. } => {
            println!("🔧 Calling: {} {}", tool, args);
        }
        ChatEvent::ToolResult { result, truncated, .. } => {
            if *truncated {
                println!("   ✓ {} [truncated]", first_line(result));
            } else {
                println!("   ✓ {}", first_line(result));
            }
        }
        ChatEvent::ResponseComplete { content } => {
            println!("Shelfwise: {}", content);
        }
        ChatEvent::Done { .. } => {
            // History is taken from the returned messages
        }
        ChatEvent::Error { message } => {
            eprintln!("\n❌ Error: {}", message);
        }
    }
}

fn first_line(text: &str) -> &str {
    text.lines().find(|l| !l.trim().is_empty()).unwrap_or("")
}
