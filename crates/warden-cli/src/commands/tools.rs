use super::builtin_registry;
use warden_tools::ToolRegistry;

pub fn run(name: Option<&str>, json: bool) -> anyhow::Result<()> {
    let tools = builtin_registry();

    if json {
        println!("{}", serde_json::to_string_pretty(&tools.tool_definitions())?);
        return Ok(());
    }
    match name {
        Some(name) => print_tool_detail(&tools, name)?,
        None => print_tool_list(&tools),
    }

    Ok(())
}

fn print_tool_list(tools: &ToolRegistry) {
    println!("Available tools ({}):", tools.len());
    for tool in tools.all() {
        println!(
            "{} [{}] - {}",
            tool.name(),
            gate_kind(tool.name()),
            tool.description()
        );
    }
}

fn print_tool_detail(tools: &ToolRegistry, name: &str) -> anyhow::Result<()> {
    let tool = tools
        .get(name)
        .ok_or_else(|| anyhow::anyhow!("Unknown tool: {name}"))?;
    let schema = serde_json::to_string_pretty(&tool.parameters_schema())?;

    println!("name: {}", tool.name());
    println!("gate: {}", gate_kind(tool.name()));
    println!("label: {}", tool.label());
    println!("description: {}", tool.description());
    println!("parameters:");
    println!("{schema}");

    Ok(())
}

/// Which confirmation rule applies to a tool.
fn gate_kind(name: &str) -> &'static str {
    match name {
        "read" | "list" => "read",
        "write" | "edit" | "delete" => "edit",
        "bash" => "command",
        _ => "unknown",
    }
}
