use std::{
  backtrace::{Backtrace, BacktraceStatus},
  fmt::{Debug, Display},
};

pub struct AppError {
  err: anyhow::Error,
}

impl AppError {
  pub fn new<E: Into<anyhow::Error>>(err: E) -> Self {
    Self { err: err.into() }
  }

  /// Wrap with a message describing what was being attempted.
  #[must_use]
  pub fn context<C>(self, context: C) -> Self
  where
    C: Display + Send + Sync + 'static,
  {
    Self {
      err: self.err.context(context),
    }
  }

  /// Get backtrace from anyhow (requires `RUST_BACKTRACE=1` to capture)
  pub fn backtrace(&self) -> &Backtrace {
    self.err.backtrace()
  }

  /// Look for a concrete error type anywhere in the cause chain.
  pub fn find<E>(&self) -> Option<&E>
  where
    E: std::error::Error + 'static,
  {
    self.err.chain().find_map(|cause| cause.downcast_ref::<E>())
  }
}

impl Display for AppError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{:#}", self.err)
  }
}

impl Debug for AppError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let bt = self.err.backtrace();
    if bt.status() == BacktraceStatus::Captured {
      write!(f, "{:#}\nBacktrace:\n{}", self.err, bt)
    } else {
      write!(
        f,
        "{:#}\n(hint: set RUST_BACKTRACE=1 to enable backtrace)",
        self.err
      )
    }
  }
}

impl<E> From<E> for AppError
where
  E: Into<anyhow::Error>,
{
  fn from(err: E) -> Self {
    Self::new(err)
  }
}
