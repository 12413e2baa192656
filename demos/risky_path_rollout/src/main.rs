use risky_path::{Action, Preset};

/// Up the spiky column, then west onto the goal.
const SCRIPT: [Action; 7] = [
    Action::North,
    Action::North,
    Action::North,
    Action::North,
    Action::North,
    Action::North,
    Action::West,
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let name = std::env::args().nth(1).unwrap_or_else(|| "v1".to_string());
    let preset = Preset::from_name(&name).ok_or_else(|| format!("unknown preset: {name}"))?;
    let mut env = preset.build()?;
    env.reset();
    println!("{}\n{}", preset.name(), env.room_text());

    for action in SCRIPT {
        let res = env.step(action);
        tracing::info!(
            action = action.as_str(),
            pos = ?env.agent_pos(),
            reward = res.reward,
            done = res.done,
            "transition"
        );
        if res.done {
            break;
        }
    }

    println!("{}", env.room_text());
    println!(
        "return {:.2} after {} steps (terminated: {}, truncated: {})",
        env.total_reward(),
        env.step_count(),
        env.terminated(),
        env.truncated()
    );
    Ok(())
}
