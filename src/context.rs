//! Interpretation context
//!
//! The context owns the scoping and variable state an evaluator runs inside.
//! It does not know what nodes mean. Evaluators report lifecycle boundaries
//! through [`Context::block_enter`], [`Context::block_leave`],
//! [`Context::interpret_enter`] and [`Context::interpret_leave`]; the context
//! handles each one itself first and then forwards it to subscribed
//! observers.
//!
//! # Example
//!
//! ```
//! use ruleflow::{Context, ContextConfig, MemoryStore, Node, Variable, VariableDefinition};
//!
//! let mut ctx: Context<Node> = Context::new(ContextConfig::default(), MemoryStore::new()).unwrap();
//! let stmt = Node::statement("total = 5");
//!
//! ctx.interpret_enter(&stmt).unwrap();
//! assert_eq!(ctx.frame_depth(), 1);
//! ctx.set_variable(&VariableDefinition::new("total").unwrap(), Variable::Int(5));
//! ctx.interpret_leave(&stmt).unwrap();
//! assert_eq!(ctx.frame_depth(), 0);
//!
//! let record = ctx.finish().unwrap();
//! assert!(record.is_finished());
//! ```

use crate::cache::{CacheMetrics, Children, NodeCache};
use crate::config::ContextConfig;
use crate::error::{ContextError, Result};
use crate::events::{ContextId, EventBus, EventKind, LifecycleEvent, Observer, SubscriptionId};
use crate::frame::Frame;
use crate::logger::TraceLogger;
use crate::node::{Node, NodeId, TreeNode};
use crate::result::{ExecutionArgument, ExecutionRecord, ResultStore};
use crate::value::Variable;
use crate::variable::{VariableDefinition, VariableStore};

/// Execution state for one interpretation run
pub struct Context<N: TreeNode = Node> {
    id: ContextId,
    config: ContextConfig,
    record: ExecutionRecord,
    store: Box<dyn ResultStore>,
    vars: VariableStore,
    frames: Vec<Frame>,
    cache: NodeCache<N>,
    bus: EventBus<N>,
    logger: Option<TraceLogger>,
    /// Pending bare statement whose leave closes the top frame
    single_statement: Option<NodeId>,
    broken: bool,
}

impl<N: TreeNode> Context<N> {
    /// Create a context and report its run to `store` as started
    pub fn new<S>(config: ContextConfig, store: S) -> Result<Self>
    where
        S: ResultStore + 'static,
    {
        Self::for_program(config, store, None)
    }

    /// Like [`Context::new`], naming the program on the execution record
    pub fn for_program<S>(config: ContextConfig, store: S, program: Option<String>) -> Result<Self>
    where
        S: ResultStore + 'static,
    {
        let id = ContextId::next();
        let mut store: Box<dyn ResultStore> = Box::new(store);
        let record = ExecutionRecord::new(program);
        store.start(&record).map_err(ContextError::Persistence)?;

        let mut bus = EventBus::new(id);
        let logger = if config.logging {
            let logger = TraceLogger::new();
            bus.subscribe(EventKind::InterpretEnter, logger.clone());
            bus.subscribe(EventKind::InterpretLeave, logger.clone());
            Some(logger)
        } else {
            None
        };

        tracing::info!(context = %id, execution = %record.id, ?config, "context started");

        Ok(Self {
            id,
            config,
            record,
            store,
            vars: VariableStore::new(),
            frames: Vec::new(),
            cache: NodeCache::new(),
            bus,
            logger,
            single_statement: None,
            broken: false,
        })
    }

    pub fn id(&self) -> ContextId {
        self.id
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    /// The in-progress execution record
    pub fn record(&self) -> &ExecutionRecord {
        &self.record
    }

    /// The trace logger, present when `logging` is enabled
    pub fn trace_logger(&self) -> Option<&TraceLogger> {
        self.logger.as_ref()
    }

    /// Top of the frame stack, `None` when no scope is open
    pub fn current_frame(&self) -> Option<&Frame> {
        self.frames.last()
    }

    pub fn frame_depth(&self) -> usize {
        self.frames.len()
    }

    /// Open frames, outermost first
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Whether a scope violation has aborted this run
    pub fn is_broken(&self) -> bool {
        self.broken
    }

    /// Direct children of `node`, memoized unless caching is disabled
    pub fn get_children(&mut self, node: &N) -> Children<N> {
        if !self.config.cache {
            return node.children().into();
        }
        self.cache.get(node)
    }

    pub fn cache_metrics(&self) -> CacheMetrics {
        self.cache.metrics()
    }

    /// Resolve a variable, yielding `Undefined` on any miss
    pub fn get_variable(&self, definition: &VariableDefinition) -> &Variable {
        self.vars.resolve(definition)
    }

    /// Bind the full definition name to `value`
    pub fn set_variable(&mut self, definition: &VariableDefinition, value: Variable) {
        self.vars.bind(definition, value);
    }

    /// Resolve by raw name, rejecting malformed names
    pub fn lookup(&self, name: &str) -> Result<&Variable> {
        let definition = VariableDefinition::new(name)?;
        Ok(self.vars.resolve(&definition))
    }

    /// Bind by raw name, rejecting malformed names
    pub fn assign(&mut self, name: &str, value: Variable) -> Result<()> {
        let definition = VariableDefinition::new(name)?;
        self.vars.bind(&definition, value);
        Ok(())
    }

    /// Bind a run argument and record it on the execution record
    pub fn bind_argument(&mut self, name: &str, value: Variable) -> Result<()> {
        let definition = VariableDefinition::new(name)?;
        self.record.arguments.push(ExecutionArgument {
            name: definition.name().to_string(),
            value: value.clone(),
        });
        self.vars.bind(&definition, value);
        Ok(())
    }

    /// Bind every run argument in order, stopping at the first malformed name
    pub fn bind_arguments<I, S>(&mut self, arguments: I) -> Result<()>
    where
        I: IntoIterator<Item = (S, Variable)>,
        S: AsRef<str>,
    {
        for (name, value) in arguments {
            self.bind_argument(name.as_ref(), value)?;
        }
        Ok(())
    }

    pub fn variables(&self) -> &VariableStore {
        &self.vars
    }

    /// Register an observer for one event kind on this context
    pub fn subscribe<O>(&mut self, kind: EventKind, observer: O) -> SubscriptionId
    where
        O: Observer<N> + 'static,
    {
        self.bus.subscribe(kind, observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.bus.subscriber_count(kind)
    }

    /// A block starts: open a frame for it
    pub fn block_enter(&mut self, node: &N) -> Result<()> {
        self.ensure_usable()?;
        self.frames.push(Frame::block(node.node_id()));
        tracing::debug!(context = %self.id, node = %node.node_id(), depth = self.frames.len(), "block frame pushed");
        self.publish(EventKind::BlockEnter, node);
        Ok(())
    }

    /// A block ends: close the top frame
    ///
    /// Fails only when no frame is open, which means the evaluator left a
    /// block it never entered.
    pub fn block_leave(&mut self, node: &N) -> Result<()> {
        self.ensure_usable()?;
        if self.frames.pop().is_none() {
            return Err(self.violation(ContextError::UnbalancedBlockLeave {
                node: node.node_id(),
            }));
        }
        tracing::debug!(context = %self.id, node = %node.node_id(), depth = self.frames.len(), "block frame popped");
        self.publish(EventKind::BlockLeave, node);
        Ok(())
    }

    /// A node starts evaluating
    ///
    /// With no open scope this is a bare statement: it becomes the pending
    /// single-statement node and gets an implicit frame. Inside an open scope
    /// nothing changes.
    pub fn interpret_enter(&mut self, node: &N) -> Result<()> {
        self.ensure_usable()?;
        if self.frames.is_empty() {
            let id = node.node_id();
            self.single_statement = Some(id);
            self.frames.push(Frame::implicit(id));
            tracing::debug!(context = %self.id, node = %id, "implicit statement frame pushed");
        }
        self.publish(EventKind::InterpretEnter, node);
        Ok(())
    }

    /// A node finishes evaluating
    ///
    /// Observers are notified first; then, if `node` is the pending
    /// single-statement node, the top frame is closed and the node is no
    /// longer pending.
    pub fn interpret_leave(&mut self, node: &N) -> Result<()> {
        self.ensure_usable()?;
        self.publish(EventKind::InterpretLeave, node);

        let id = node.node_id();
        if self.single_statement != Some(id) {
            return Ok(());
        }

        self.single_statement = None;
        if self.frames.pop().is_none() {
            return Err(self.violation(ContextError::UnbalancedStatementLeave { node: id }));
        }
        tracing::debug!(context = %self.id, node = %id, depth = self.frames.len(), "statement frame popped");
        Ok(())
    }

    fn publish(&mut self, kind: EventKind, node: &N) {
        let event = LifecycleEvent {
            kind,
            node,
            context: self.id,
            depth: self.frames.len(),
        };
        self.bus.publish(&event);
    }

    fn ensure_usable(&self) -> Result<()> {
        if self.broken {
            return Err(ContextError::Broken { context: self.id });
        }
        Ok(())
    }

    fn violation(&mut self, err: ContextError) -> ContextError {
        tracing::error!(context = %self.id, error = %err, "scope discipline violated; run aborted");
        self.broken = true;
        err
    }

    /// End the run: stamp the record finished, report it, drop all observers
    pub fn finish(mut self) -> Result<ExecutionRecord> {
        if !self.frames.is_empty() {
            tracing::warn!(context = %self.id, depth = self.frames.len(), "finishing with open frames");
        }
        self.bus.clear();
        self.record.finish_time = Some(chrono::Utc::now());
        self.store
            .finish(&self.record)
            .map_err(ContextError::Persistence)?;
        tracing::info!(context = %self.id, execution = %self.record.id, "context finished");
        Ok(self.record)
    }
}
