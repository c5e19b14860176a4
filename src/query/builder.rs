use super::{Error, IsSupportedOp, Op, Value};

pub struct CompiledClause {
    pub clause: String,
    pub values: Vec<Value>,
}

impl CompiledClause {
    pub fn new(clause: String, values: Vec<Value>) -> Self {
        Self { clause, values }
    }

    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.clause, self.values)
    }
}

/// Turns a single `field <op> value` constraint into a backend clause.
pub trait CompileClause {
    fn compile_clause<V>(&mut self, field: &str, op: Op<V>) -> Result<CompiledClause, Error>
    where
        V: Into<Value> + IsSupportedOp + Clone;
}

#[derive(Debug)]
pub struct CompilerResult {
    pub clauses: Vec<String>,
    pub values: Vec<Value>,
}

impl CompilerResult {
    fn new() -> Self {
        Self {
            clauses: Vec::new(),
            values: Vec::new(),
        }
    }

    pub fn is_unfiltered(&self) -> bool {
        self.clauses.is_empty()
    }
}

pub struct ClausesCompiler {
    result: CompilerResult,
    error: Option<Error>,
}

impl Default for ClausesCompiler {
    fn default() -> Self {
        Self::new()
    }
}

impl ClausesCompiler {
    pub fn new() -> Self {
        Self {
            result: CompilerResult::new(),
            error: None,
        }
    }

    pub fn expr<F, V>(mut self, field: &str, op: Op<V>, mapper: &mut F) -> Self
    where
        V: Into<Value> + IsSupportedOp + Clone,
        F: CompileClause,
    {
        if self.error.is_some() {
            return self;
        }

        if !op.is_supported_op() {
            self.error = Some(Error::UnsupportedOp {
                field: field.to_owned(),
            });
            return self;
        }

        match mapper.compile_clause(field, op) {
            Ok(compiled) => {
                let (clause, mut values) = compiled.into_parts();
                self.result.clauses.push(clause);
                self.result.values.append(&mut values);
            }
            Err(err) => self.error = Some(err),
        }

        self
    }

    /// Same as [`ClausesCompiler::expr`], skipping absent constraints.
    pub fn opt_expr<F, V>(self, field: &str, op: Option<Op<V>>, mapper: &mut F) -> Self
    where
        V: Into<Value> + IsSupportedOp + Clone,
        F: CompileClause,
    {
        match op {
            Some(op) => self.expr(field, op, mapper),
            None => self,
        }
    }

    /// Adds a clause that binds no values.
    pub fn raw(mut self, clause: &str) -> Self {
        if self.error.is_none() {
            self.result.clauses.push(clause.to_owned());
        }
        self
    }

    pub fn compile(self) -> Result<CompilerResult, Error> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.result),
        }
    }
}
