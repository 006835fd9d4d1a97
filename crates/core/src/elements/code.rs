use super::ComposeContext;
use folio_script::{Bindings, CODE_KEY, ERROR_KEY, ErrorKind, Host, ScriptError, Value};
use folio_types::{Color, Size, TextStyle};

/// Where a code block is in its run cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Completed,
    Failed(ErrorKind),
}

/// A block of script source that runs against a shared binding set.
///
/// Guarded blocks (the default) never fail: the error kind is stored under
/// `__error__` and a warning is logged. Strict blocks return the error.
/// Either way the source is stored under `__code__` unless that name is
/// already bound.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeBlock {
    code: String,
    strict: bool,
    state: RunState,
    bindings: Option<Bindings>,
    style: TextStyle,
}

impl CodeBlock {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            strict: false,
            state: RunState::Idle,
            bindings: None,
            style: TextStyle::new("Courier", 9.0).with_fill(Color::gray(0.2)),
        }
    }

    /// A block whose failures propagate to the caller.
    pub fn strict(code: impl Into<String>) -> Self {
        Self::new(code).with_strict(true)
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_style(mut self, style: TextStyle) -> Self {
        self.style = style;
        self
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn set_code(&mut self, code: impl Into<String>) {
        self.code = code.into();
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn style(&self) -> &TextStyle {
        &self.style
    }

    /// The binding set as it was after the last run.
    pub fn last_bindings(&self) -> Option<&Bindings> {
        self.bindings.as_ref()
    }

    /// Runs against `targets`, or a fresh binding set, and returns it.
    pub fn run(
        &mut self,
        host: &mut dyn Host,
        targets: Option<Bindings>,
    ) -> Result<Bindings, ScriptError> {
        let mut targets = targets.unwrap_or_default();
        self.run_with(host, &mut targets)?;
        Ok(targets)
    }

    /// Runs against a binding set owned by the caller.
    pub fn run_with(&mut self, host: &mut dyn Host, targets: &mut Bindings) -> Result<(), ScriptError> {
        self.state = RunState::Running;
        let outcome = folio_script::execute(&self.code, host, targets);
        let result = match outcome {
            Ok(()) => {
                self.state = RunState::Completed;
                if !self.strict {
                    targets.insert(ERROR_KEY, Value::None);
                }
                Ok(())
            }
            Err(err) => {
                self.state = RunState::Failed(err.kind);
                if self.strict {
                    Err(err)
                } else {
                    log::warn!("### {} ### {}", err.kind, self.code);
                    log::debug!("Code block error: {}", err.message);
                    targets.insert(ERROR_KEY, err.kind.label());
                    Ok(())
                }
            }
        };
        targets.insert_if_absent(CODE_KEY, self.code.as_str());
        self.bindings = Some(targets.clone());
        result
    }

    /// Source lines in the code style when sources are shown, else nothing.
    pub(crate) fn measure(&self, cx: &ComposeContext<'_>) -> Size {
        if !cx.show_source {
            return Size::zero();
        }
        let lines: Vec<&str> = self.code.lines().collect();
        let width = lines
            .iter()
            .map(|line| cx.measure.text_size(line, &self.style).width)
            .fold(0.0, f32::max);
        Size::new(width, lines.len() as f32 * self.style.leading())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_script::NoHost;

    #[test]
    fn guarded_run_stores_result_and_source() {
        let mut block = CodeBlock::new("a = 100 * 300");
        let result = block.run(&mut NoHost, None).unwrap();
        assert_eq!(result.get_int("a"), Some(30000));
        assert_eq!(result.get_str(CODE_KEY), Some("a = 100 * 300"));
        assert_eq!(result.get(ERROR_KEY), Some(&Value::None));
        assert_eq!(block.state(), RunState::Completed);
    }

    #[test]
    fn guarded_run_records_the_error_kind() {
        let mut block = CodeBlock::new("a = undefined_name + 1");
        let result = block.run(&mut NoHost, None).unwrap();
        assert_eq!(result.get_str(ERROR_KEY), Some("NameError"));
        assert_eq!(result.get_str(CODE_KEY), Some("a = undefined_name + 1"));
        assert_eq!(block.state(), RunState::Failed(ErrorKind::UnresolvedName));

        for (code, label) in [
            ("a = 1 + 'x'", "TypeError"),
            ("a = = 1", "SyntaxError"),
            ("a = 'x'.missing", "AttributeError"),
            ("a = 1 // 0", "Unknown Error"),
        ] {
            let result = CodeBlock::new(code).run(&mut NoHost, None).unwrap();
            assert_eq!(result.get_str(ERROR_KEY), Some(label), "{}", code);
        }
    }

    #[test]
    fn strict_run_propagates() {
        let mut block = CodeBlock::strict("a = missing");
        let err = block.run(&mut NoHost, None).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnresolvedName);
        assert_eq!(block.state(), RunState::Failed(ErrorKind::UnresolvedName));
    }

    #[test]
    fn runs_share_the_caller_bindings() {
        let mut targets = Bindings::new();
        let mut block = CodeBlock::new("a = 100 * 300");
        block.run_with(&mut NoHost, &mut targets).unwrap();
        block.set_code("aa = 200 * a");
        block.run_with(&mut NoHost, &mut targets).unwrap();
        assert_eq!(targets.get_int("aa"), Some(6_000_000));
        // The first source stays under __code__.
        assert_eq!(targets.get_str(CODE_KEY), Some("a = 100 * 300"));
        let keys: Vec<_> = targets.keys().collect();
        assert_eq!(keys, vec!["a", "__error__", "__code__", "aa"]);
        assert_eq!(block.last_bindings(), Some(&targets));
    }

    #[test]
    fn strict_success_does_not_add_error_key() {
        let result = CodeBlock::strict("x = 1").run(&mut NoHost, None).unwrap();
        assert!(!result.contains(ERROR_KEY));
        assert!(result.contains(CODE_KEY));
    }
}
