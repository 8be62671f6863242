use std::fmt::Display;

/// Severity of a conversion log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
	Info,
	Warn,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
	pub level: LogLevel,
	pub message: String,
}

impl Display for LogLine {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.message)
	}
}

/// The human readable record of a conversion. Every line is also emitted as
/// a `tracing` event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionLog {
	lines: Vec<LogLine>,
}

impl ConversionLog {
	pub fn info(&mut self, message: impl Into<String>) {
		let message = message.into();
		tracing::info!("{message}");
		self.lines.push(LogLine {
			level: LogLevel::Info,
			message,
		});
	}

	pub fn warn(&mut self, message: impl Into<String>) {
		let message = message.into();
		tracing::warn!("{message}");
		self.lines.push(LogLine {
			level: LogLevel::Warn,
			message,
		});
	}

	pub fn lines(&self) -> &[LogLine] {
		&self.lines
	}

	pub fn warnings(&self) -> impl Iterator<Item = &LogLine> {
		self.lines
			.iter()
			.filter(|line| line.level == LogLevel::Warn)
	}

	/// The log as text, one line per entry.
	pub fn to_text(&self) -> String {
		let mut text = String::new();
		for line in &self.lines {
			text.push_str(&line.message);
			text.push('\n');
		}
		text
	}
}
