use anyhow::Result;
use pulsetx::audio;

pub(crate) fn list_input_devices() -> Result<()> {
    // PULSETX_TEST_DEVICES stands in for the host device list in tests.
    let devices = if let Ok(raw) = std::env::var("PULSETX_TEST_DEVICES") {
        raw.split(',')
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect()
    } else {
        audio::list_input_devices().unwrap_or_else(|err| {
            eprintln!("Failed to list audio input devices: {err}");
            Vec::new()
        })
    };

    if devices.is_empty() {
        println!("No audio input devices detected.");
    } else {
        println!("Available audio input devices:");
        for name in devices {
            println!("  - {name}");
        }
    }
    Ok(())
}
