//! Result rendering.
//!
//! Turning a value into text is an injected strategy: a [`CompileFn`] turns
//! the user's format string into a [`FormatFn`] once per invocation, and the
//! [`Renderer`] applies it to each response (or each item of a sequence) and
//! writes the text to a shared sink.  The default strategy is
//! [`compile_template`], which uses minijinja.

use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};

use minijinja::Environment;
use serde::Serialize;

use crate::error::CscError;

/// Formats one serialized value.
pub type FormatFn = Arc<dyn Fn(&serde_json::Value) -> Result<String, CscError> + Send + Sync>;

/// Compiles a format string into a [`FormatFn`].
pub type CompileFn = fn(&str) -> Result<FormatFn, CscError>;

/// Destination for rendered output, shared by concurrent render tasks.
pub type Sink = Arc<Mutex<dyn Write + Send>>;

/// Default output for volume info: capacity followed by the sorted id pairs.
pub const VOLUME_INFO_FORMAT: &str = "{{ capacity_bytes }}\
{% if id %}{% for k, v in id.values|dictsort %}\t{{ k }}={{ v }}{% endfor %}{% endif %}\n";

/// Default output for publish info: one `key=value` line per entry.
pub const PUBLISH_INFO_FORMAT: &str =
    "{% for k, v in values|dictsort %}{{ k }}={{ v }}\n{% endfor %}";

/// Default output for a capability validation result.
pub const VALIDATION_FORMAT: &str =
    "supported: {{ supported }}{% if message %} ({{ message }}){% endif %}\n";

/// Default output for one controller capability.
pub const CAPABILITY_FORMAT: &str = "{% if type.rpc %}{{ type.rpc.type }}{% endif %}\n";

/// Stdout as a [`Sink`].
pub fn stdout_sink() -> Sink {
    Arc::new(Mutex::new(std::io::stdout()))
}

/// Compile `template` with minijinja.
///
/// Trailing newlines in the template are kept so that a format string like
/// `"{{ name }}\n"` produces one line per item.
pub fn compile_template(template: &str) -> Result<FormatFn, CscError> {
    let mut env = Environment::new();
    env.set_keep_trailing_newline(true);
    env.add_template_owned("format", template.to_owned())
        .map_err(CscError::template)?;

    Ok(Arc::new(move |value: &serde_json::Value| {
        env.get_template("format")
            .and_then(|tmpl| tmpl.render(value))
            .map_err(CscError::template)
    }))
}

/// Applies one compiled format to values and writes the result.
#[derive(Clone)]
pub struct Renderer {
    format: FormatFn,
    sink: Sink,
}

impl Renderer {
    pub fn new(format: FormatFn, sink: Sink) -> Self {
        Self { format, sink }
    }

    /// Render a single value.
    ///
    /// The text is produced before the sink is locked and written with one
    /// `write_all`, so concurrent renders never interleave inside an item.
    pub fn render<T: Serialize + ?Sized>(&self, value: &T) -> Result<(), CscError> {
        let value = serde_json::to_value(value).map_err(CscError::template)?;
        let text = (self.format)(&value)?;
        write_locked(&self.sink, text.as_bytes())
    }

    /// Render each item in order, stopping at the first failure.
    pub fn render_all<'a, T, I>(&self, items: I) -> Result<(), CscError>
    where
        T: Serialize + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        items.into_iter().try_for_each(|item| self.render(item))
    }
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer").finish_non_exhaustive()
    }
}

/// Write a complete line to the sink, bypassing the format.
pub fn write_line(sink: &Sink, line: &str) -> Result<(), CscError> {
    let mut text = String::with_capacity(line.len() + 1);
    text.push_str(line);
    text.push('\n');
    write_locked(sink, text.as_bytes())
}

fn write_locked(sink: &Sink, bytes: &[u8]) -> Result<(), CscError> {
    let mut out = sink.lock().unwrap_or_else(PoisonError::into_inner);
    out.write_all(bytes)?;
    out.flush()?;
    Ok(())
}
