use becomeit_core::storage::HABIT_TEMPLATES;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(HABIT_TEMPLATES)?);
    Ok(())
}
