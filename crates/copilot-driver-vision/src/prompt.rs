/// Asks whether Copilot Agent mode has finished and the "Keep" button is clickable.
pub const KEEP_BUTTON_PROMPT: &str = r#"
The image is a screenshot of Visual Studio Code.
A prompt was sent to GitHub Copilot Chat in Agent mode, asking it to write code.
While the agent is still working, the "Keep" button is grayed out. Once the code
is generated and the agent has finished, the "Keep" button becomes enabled.

Reply with JSON in exactly this shape:
{
    "button": "enabled" or "disabled"
}

Return "enabled" when the Keep button is enabled.
Return "disabled" when it is still grayed out.
"#;

/// Asks whether a `pip install` running in the integrated terminal has finished.
pub const INSTALLATION_PROMPT: &str = r#"
The image is a screenshot of a PowerShell / Command Prompt terminal where
`pip install` is running. Decide whether the installation has finished.

When installation is complete, the terminal shows an empty prompt such as
"PS C:\path>" or "C:\path>" waiting for the next command.
While installation is in progress you will see output like:
- "Collecting package_name..."
- "Downloading..."
- "Installing collected packages..."
- "Successfully installed..."
- progress bars or percentages

Reply with JSON in exactly this shape:
{
    "installation_status": "complete" or "in_progress"
}

Return "complete" when you see an empty command prompt ready for input.
Return "in_progress" when you see any installation activity or output.
"#;
