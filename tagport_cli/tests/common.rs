use assert_cmd::Command;
use insta_cmd::get_cargo_bin;

pub fn tagport_cmd() -> Command {
	let mut cmd = Command::new(get_cargo_bin("tagport"));
	cmd.env("NO_COLOR", "1");
	cmd.env_remove("TAGPORT_LOG");
	cmd
}

/// A single-part JSON document whose body holds one plain run per entry.
#[allow(dead_code)]
pub fn document_json(paragraphs: &[&str]) -> String {
	let blocks: Vec<serde_json::Value> = paragraphs
		.iter()
		.map(|text| {
			serde_json::json!({
				"type": "paragraph",
				"children": [{
					"type": "run",
					"content": [{ "type": "text", "value": text }],
				}],
			})
		})
		.collect();

	serde_json::json!({
		"parts": [{ "name": "body", "blocks": blocks }],
	})
	.to_string()
}
