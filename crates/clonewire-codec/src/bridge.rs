//! Function-to-channel bridge
//!
//! Every function met during encoding gets its own port pair. The serving end
//! stays with the sender and answers `[replyPort, encodedArgs]` requests with
//! `[ok, encodedPayload]`; the other end travels to the receiver, whose decoder
//! wraps it in a callable proxy.
//!
//! Failures of the invoked function reach the proxy's caller as rejections.
//! Failures of the serving machinery itself have no caller to report to, so they
//! are logged under the `clonewire::bridge` target and dropped.

use crate::Codec;
use async_trait::async_trait;
use clonewire_core::{
    CallResult, Callable, CodecError, CodecResult, ErrorValue, Function, Port, Transferable,
    Value,
};
use tokio::task::JoinError;

/// Target for every bridge event
pub(crate) const LOG_TARGET: &str = "clonewire::bridge";

/// Start serving `function` on `endpoint`
///
/// The serving loop ends when the pair is closed or every remote handle to the
/// other end has been dropped.
pub(crate) fn serve(codec: &Codec, endpoint: Port, function: Function) -> CodecResult<()> {
    let runtime = codec.runtime()?;
    let spawner = runtime.clone();
    let codec = codec.clone();
    let bridge = endpoint.id();

    tracing::debug!(target: LOG_TARGET, port = bridge, "function bridge started");
    runtime.spawn(async move {
        while let Some(message) = endpoint.recv().await {
            spawner.spawn(handle_call(codec.clone(), function.clone(), message));
        }
        tracing::debug!(target: LOG_TARGET, port = bridge, "function bridge released");
    });
    Ok(())
}

async fn handle_call(codec: Codec, function: Function, message: Value) {
    let (reply, args) = match split_request(message) {
        Ok(request) => request,
        Err(err) => {
            tracing::error!(target: LOG_TARGET, error = %err, "dropping call request");
            return;
        }
    };

    tracing::trace!(target: LOG_TARGET, reply = reply.id(), "serving remote call");
    let outcome = invoke(&codec, function, args).await;

    if let Err(err) = deliver(&codec, &reply, outcome) {
        tracing::error!(
            target: LOG_TARGET,
            reply = reply.id(),
            error = %err,
            "failed to deliver remote call reply"
        );
    }
}

async fn invoke(codec: &Codec, function: Function, args: Value) -> CallResult {
    let args = match codec.decode(args) {
        Ok(Value::Array(args)) => args,
        Ok(other) => vec![other],
        Err(err) => return Err(reject(err)),
    };

    // A panicking function must not take the serving task down with it
    match tokio::spawn(async move { function.call(args).await }).await {
        Ok(outcome) => outcome,
        Err(err) => Err(ErrorValue::plain(join_failure(err)).into()),
    }
}

fn deliver(codec: &Codec, reply: &Port, outcome: CallResult) -> CodecResult<()> {
    let (ok, value) = match outcome {
        Ok(value) => (true, value),
        Err(value) => (false, value),
    };

    let delivered = codec.encode(&value).and_then(|encoded| {
        reply.post(
            Value::Array(vec![Value::Bool(ok), encoded.data]),
            &encoded.transferables,
        )
    });

    if let Err(err) = delivered {
        // Tell the caller why instead of leaving it waiting
        let fallback = codec.encode(&Value::from(ErrorValue::from(&err)))?;
        reply.post(
            Value::Array(vec![Value::Bool(false), fallback.data]),
            &fallback.transferables,
        )?;
        return Err(err);
    }
    Ok(())
}

fn split_request(message: Value) -> CodecResult<(Port, Value)> {
    if let Value::Array(items) = message {
        let mut items = items.into_iter();
        if let (Some(Value::Port(reply)), Some(args), None) =
            (items.next(), items.next(), items.next())
        {
            return Ok((reply, args));
        }
    }
    Err(CodecError::Malformed(
        "call request must be [replyPort, args]".into(),
    ))
}

fn split_reply(message: Value) -> CodecResult<(bool, Value)> {
    if let Value::Array(items) = message {
        let mut items = items.into_iter();
        if let (Some(Value::Bool(ok)), Some(payload), None) =
            (items.next(), items.next(), items.next())
        {
            return Ok((ok, payload));
        }
    }
    Err(CodecError::Malformed("reply must be [ok, payload]".into()))
}

fn join_failure(err: JoinError) -> String {
    if !err.is_panic() {
        return "remote function task was cancelled".to_string();
    }
    let panic = err.into_panic();
    if let Some(msg) = panic.downcast_ref::<&str>() {
        format!("remote function panicked: {msg}")
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        format!("remote function panicked: {msg}")
    } else {
        "remote function panicked".to_string()
    }
}

fn reject(err: CodecError) -> Value {
    ErrorValue::from(err).into()
}

/// Wrap a received endpoint in a callable proxy
pub(crate) fn proxy(codec: Codec, endpoint: Port) -> Function {
    Function::from_callable(RemoteFunction { codec, endpoint })
}

/// Caller side of a bridged function
///
/// Each call gets a private reply pair, so concurrent calls never share state.
/// Without a configured deadline a call waits until the serving side replies,
/// closes the pair, or goes away.
struct RemoteFunction {
    codec: Codec,
    endpoint: Port,
}

impl RemoteFunction {
    fn send(&self, args: Vec<Value>) -> CodecResult<Port> {
        let encoded = self.codec.encode(&Value::Array(args))?;
        let (reply, reply_remote) = Port::pair();

        let mut transfer = encoded.transferables;
        transfer.push(Transferable::Port(reply_remote.clone()));
        self.endpoint.post(
            Value::Array(vec![Value::Port(reply_remote), encoded.data]),
            &transfer,
        )?;
        Ok(reply)
    }

    async fn round_trip(&self, args: Vec<Value>) -> CallResult {
        let reply = self.send(args).map_err(reject)?;

        let message = tokio::select! {
            biased;
            message = reply.recv() => message,
            _ = self.endpoint.closed() => None,
        };
        let Some(message) = message else {
            return Err(ErrorValue::plain("remote endpoint closed before replying").into());
        };

        let (ok, payload) = split_reply(message).map_err(reject)?;
        let value = self.codec.decode(payload).map_err(reject)?;
        if ok { Ok(value) } else { Err(value) }
    }
}

#[async_trait]
impl Callable for RemoteFunction {
    async fn call(&self, args: Vec<Value>) -> CallResult {
        match self.codec.config().call_timeout() {
            Some(timeout) => match tokio::time::timeout(timeout, self.round_trip(args)).await {
                Ok(outcome) => outcome,
                Err(_) => Err(reject(CodecError::Timeout)),
            },
            None => self.round_trip(args).await,
        }
    }
}
