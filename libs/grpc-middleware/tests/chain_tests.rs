#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Ordering and composition of interceptor chains for every call shape.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use common::{tag, Log, MemoryClientStream, MemoryServerStream};
use futures::FutureExt;
use grpc_middleware::{
    chain, chain_stream_client, chain_stream_server, chain_unary_client, chain_unary_server,
    interceptor_fn, invoke, BoxClientStream, BoxServerStream, CallContext, ClientConn,
    ClientStream, InterceptorRef, ServerStream, ServiceRef, StreamClient, StreamClientCall,
    StreamDesc, StreamServer, StreamServerCall, StreamServerInfo, UnaryClient, UnaryClientCall,
    UnaryServer, UnaryServerCall, UnaryServerInfo,
};
use tonic::{Code, Status};

type Unary = UnaryServer<u32, u32>;

const METHOD: &str = "/demo.Greeter/SayHello";

fn service() -> ServiceRef {
    Arc::new(())
}

fn add(n: u32) -> InterceptorRef<Unary> {
    interceptor_fn::<Unary, _>(move |mut call, _info, next| {
        call.request += n;
        next.run(call)
    })
}

#[tokio::test]
async fn unary_server_runs_first_interceptor_outermost() {
    let log = Log::default();
    let chained = chain_unary_server::<u32, u32>([tag("A", &log), tag("B", &log), tag("C", &log)]);
    let handler_log = log.clone();
    let handler = move |call: UnaryServerCall<u32>| {
        handler_log.push("handler");
        async move { Ok::<_, Status>(call.request) }
    };
    let info = UnaryServerInfo::new(METHOD);

    let out = invoke(
        &*chained,
        UnaryServerCall::new(CallContext::new(), 9),
        &info,
        &handler,
    )
    .await;

    assert_eq!(out.unwrap(), 9);
    assert_eq!(
        log.entries(),
        ["A>", "B>", "C>", "handler", "<C", "<B", "<A"]
    );
}

#[tokio::test]
async fn stream_server_runs_every_interceptor_once_in_order() {
    let log = Log::default();
    let sent = Log::default();
    let chained =
        chain_stream_server::<BoxServerStream>([tag("A", &log), tag("B", &log), tag("C", &log)]);
    let handler_log = log.clone();
    let handler = move |mut call: StreamServerCall| {
        handler_log.push("handler");
        async move {
            let msg = call.stream.recv_message().await?.expect("one message");
            let text = msg.downcast::<String>().expect("string message");
            call.stream.send_message(Arc::new(text.to_uppercase())).await
        }
    };
    let stream: BoxServerStream = Box::new(
        MemoryServerStream::new(CallContext::new(), &sent)
            .with_inbound(Arc::new("hello".to_owned())),
    );
    let info = StreamServerInfo::new(METHOD);

    invoke(
        &*chained,
        StreamServerCall::new(service(), stream),
        &info,
        &handler,
    )
    .await
    .unwrap();

    assert_eq!(
        log.entries(),
        ["A>", "B>", "C>", "handler", "<C", "<B", "<A"]
    );
    assert_eq!(sent.entries(), ["HELLO"]);
}

#[tokio::test]
async fn unary_client_runs_first_interceptor_outermost() {
    let log = Log::default();
    let chained = chain_unary_client::<u32, u32>([tag("A", &log), tag("B", &log)]);
    let invoker_log = log.clone();
    let invoker = move |call: UnaryClientCall<u32>| {
        invoker_log.push(format!("invoke {}", call.method));
        async move { Ok::<_, Status>(call.request + 1) }
    };
    let call = UnaryClientCall::new(
        CallContext::new(),
        ClientConn::new("http://localhost:50051"),
        METHOD,
        41,
    );

    let reply = invoke(&*chained, call, &(), &invoker).await.unwrap();

    assert_eq!(reply, 42);
    assert_eq!(
        log.entries(),
        ["A>", "B>", "invoke /demo.Greeter/SayHello", "<B", "<A"]
    );
}

#[tokio::test]
async fn stream_client_returns_the_streamer_stream() {
    let log = Log::default();
    let sent = Log::default();
    let chained = chain_stream_client::<BoxClientStream>([tag("A", &log), tag("B", &log)]);
    let streamer_log = log.clone();
    let streamer_sent = sent.clone();
    let streamer = move |call: StreamClientCall| {
        streamer_log.push(format!("open {}", call.desc.stream_name));
        let stream: BoxClientStream = Box::new(MemoryClientStream::new(call.ctx, &streamer_sent));
        async move { Ok::<_, Status>(stream) }
    };
    let call = StreamClientCall::new(
        CallContext::new(),
        StreamDesc::new("Chat", true, true),
        ClientConn::new("http://localhost:50051"),
        "/demo.Greeter/Chat",
    );

    let mut stream = invoke(&*chained, call, &(), &streamer).await.unwrap();
    stream.send_message(Arc::new("ping".to_owned())).await.unwrap();
    stream.close_send().await.unwrap();

    assert_eq!(log.entries(), ["A>", "B>", "open Chat", "<B", "<A"]);
    assert_eq!(sent.entries(), ["ping"]);
    assert_eq!(
        stream
            .send_message(Arc::new("late".to_owned()))
            .await
            .unwrap_err()
            .code(),
        Code::FailedPrecondition
    );
}

#[tokio::test]
async fn empty_chain_delegates_unchanged() {
    let chained = chain::<Unary>(Vec::new());
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let handler = move |call: UnaryServerCall<u32>| {
        seen.fetch_add(1, Ordering::SeqCst);
        async move { Ok::<_, Status>(call.request * 3) }
    };
    let info = UnaryServerInfo::new(METHOD);

    let out = invoke(
        &*chained,
        UnaryServerCall::new(CallContext::new(), 5),
        &info,
        &handler,
    )
    .await;
    assert_eq!(out.unwrap(), 15);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let client = chain_stream_client::<BoxClientStream>([]);
    let sent = Log::default();
    let streamer_sent = sent.clone();
    let streamer = move |call: StreamClientCall| {
        let stream: BoxClientStream = Box::new(MemoryClientStream::new(call.ctx, &streamer_sent));
        async move { Ok::<_, Status>(stream) }
    };
    let call = StreamClientCall::new(
        CallContext::new(),
        StreamDesc::new("Chat", false, true),
        ClientConn::new("http://localhost:50051"),
        "/demo.Greeter/Chat",
    );
    assert!(invoke(&*client, call, &(), &streamer).await.is_ok());
}

#[test]
fn single_interceptor_is_returned_unwrapped() {
    let log = Log::default();
    let only: InterceptorRef<StreamServer> = tag("A", &log);
    let chained = chain_stream_server([Arc::clone(&only)]);
    assert!(Arc::ptr_eq(&only, &chained));
}

#[tokio::test]
async fn interceptor_can_short_circuit() {
    let log = Log::default();
    let deny = interceptor_fn::<Unary, _>(|_call, _info, _next| {
        futures::future::ready(Err::<u32, _>(Status::permission_denied("blocked"))).boxed()
    });
    let chained = chain([tag("A", &log), deny, tag("C", &log)]);
    let handler_log = log.clone();
    let handler = move |call: UnaryServerCall<u32>| {
        handler_log.push("handler");
        async move { Ok::<_, Status>(call.request) }
    };
    let info = UnaryServerInfo::new(METHOD);

    let err = invoke(
        &*chained,
        UnaryServerCall::new(CallContext::new(), 1),
        &info,
        &handler,
    )
    .await
    .unwrap_err();

    assert_eq!(err.code(), Code::PermissionDenied);
    assert_eq!(log.entries(), ["A>", "<A"]);
}

#[tokio::test]
async fn handler_error_reaches_caller_unchanged() {
    let log = Log::default();
    let chained = chain::<Unary>([tag("A", &log), tag("B", &log)]);
    let handler = |_call: UnaryServerCall<u32>| async move {
        Err::<u32, _>(Status::not_found("no such user"))
    };
    let info = UnaryServerInfo::new(METHOD);

    let err = invoke(
        &*chained,
        UnaryServerCall::new(CallContext::new(), 1),
        &info,
        &handler,
    )
    .await
    .unwrap_err();

    assert_eq!(err.code(), Code::NotFound);
    assert_eq!(err.message(), "no such user");
    assert_eq!(log.entries(), ["A>", "B>", "<B", "<A"]);
}

#[derive(Debug, Clone, PartialEq)]
struct RequestId(String);

#[tokio::test]
async fn context_values_flow_to_later_links() {
    let stamp = interceptor_fn::<Unary, _>(|mut call, _info, next| {
        call.ctx = call.ctx.with_value(RequestId("req-1".to_owned()));
        next.run(call)
    });
    let check = interceptor_fn::<Unary, _>(|call, _info, next| {
        async move {
            if call.ctx.value::<RequestId>().is_none() {
                return Err(Status::internal("request id missing"));
            }
            next.run(call).await
        }
        .boxed()
    });
    let chained = chain([stamp, check]);
    let handler = |call: UnaryServerCall<u32>| async move {
        let id = call.ctx.value::<RequestId>().cloned();
        assert_eq!(id, Some(RequestId("req-1".to_owned())));
        Ok::<_, Status>(call.request)
    };
    let info = UnaryServerInfo::new(METHOD);

    let out = invoke(
        &*chained,
        UnaryServerCall::new(CallContext::new(), 3),
        &info,
        &handler,
    )
    .await;
    assert_eq!(out.unwrap(), 3);
}

#[tokio::test]
async fn every_link_sees_the_same_info() {
    let log = Log::default();
    let record = |log: &Log| {
        let log = log.clone();
        interceptor_fn::<Unary, _>(move |call, info, next| {
            log.push(info.full_method.clone());
            next.run(call)
        })
    };
    let chained = chain([record(&log), record(&log), record(&log)]);
    let handler = |call: UnaryServerCall<u32>| async move { Ok::<_, Status>(call.request) };
    let info = UnaryServerInfo::new(METHOD);

    invoke(
        &*chained,
        UnaryServerCall::new(CallContext::new(), 0),
        &info,
        &handler,
    )
    .await
    .unwrap();

    assert_eq!(log.entries(), [METHOD; 3]);
}

#[tokio::test]
async fn nested_chains_preserve_order() {
    let log = Log::default();
    let inner = chain::<Unary>([tag("B", &log), tag("C", &log)]);
    let chained = chain([tag("A", &log), inner, tag("D", &log)]);
    let handler = |call: UnaryServerCall<u32>| async move { Ok::<_, Status>(call.request) };
    let info = UnaryServerInfo::new(METHOD);

    invoke::<Unary>(
        &*chained,
        UnaryServerCall::new(CallContext::new(), 0),
        &info,
        &handler,
    )
    .await
    .unwrap();

    assert_eq!(
        log.entries(),
        ["A>", "B>", "C>", "D>", "<D", "<C", "<B", "<A"]
    );
}

#[tokio::test]
async fn request_replaced_by_earlier_link_is_seen_by_later_links() {
    let double = interceptor_fn::<Unary, _>(|mut call, _info, next| {
        call.request *= 2;
        next.run(call)
    });
    let chained = chain([add(1), double, add(3)]);
    let handler = |call: UnaryServerCall<u32>| async move { Ok::<_, Status>(call.request) };
    let info = UnaryServerInfo::new(METHOD);

    let out = invoke(
        &*chained,
        UnaryServerCall::new(CallContext::new(), 1),
        &info,
        &handler,
    )
    .await;
    assert_eq!(out.unwrap(), (1 + 1) * 2 + 3);
}

#[tokio::test]
async fn deep_chain_runs_every_link() {
    let chained = chain((0..256).map(|_| add(1)));
    let handler = |call: UnaryServerCall<u32>| async move { Ok::<_, Status>(call.request) };
    let info = UnaryServerInfo::new(METHOD);

    let out = invoke(
        &*chained,
        UnaryServerCall::new(CallContext::new(), 0),
        &info,
        &handler,
    )
    .await;
    assert_eq!(out.unwrap(), 256);
}

#[tokio::test]
async fn chain_is_shared_by_concurrent_calls() {
    let chained = chain([add(1), add(10), add(100)]);

    let tasks: Vec<_> = (0..32_u32)
        .map(|i| {
            let chained = Arc::clone(&chained);
            tokio::spawn(async move {
                let handler = |call: UnaryServerCall<u32>| async move {
                    tokio::task::yield_now().await;
                    Ok::<_, Status>(call.request)
                };
                let info = UnaryServerInfo::new(METHOD);
                invoke(
                    &*chained,
                    UnaryServerCall::new(CallContext::new(), i * 1000),
                    &info,
                    &handler,
                )
                .await
            })
        })
        .collect();

    for (i, task) in (0..32_u32).zip(tasks) {
        assert_eq!(task.await.unwrap().unwrap(), i * 1000 + 111);
    }
}

#[tokio::test]
async fn stream_interceptor_can_replace_the_stream() {
    #[derive(Debug, Clone, PartialEq)]
    struct Tenant(&'static str);

    let sent = Log::default();
    let wrap = interceptor_fn::<StreamServer, _>(|call, _info, next| {
        let ctx = call.stream.context().clone().with_value(Tenant("acme"));
        let stream: BoxServerStream =
            Box::new(grpc_middleware::WrappedServerStream::new(call.stream, ctx));
        next.run(StreamServerCall::new(call.service, stream))
    });
    let chained = chain([wrap]);
    let handler = |call: StreamServerCall| async move {
        match call.stream.context().value::<Tenant>() {
            Some(Tenant("acme")) => Ok(()),
            _ => Err(Status::internal("tenant missing")),
        }
    };
    let info = StreamServerInfo::new(METHOD).with_streaming(false, true);

    invoke(
        &*chained,
        StreamServerCall::new(
            service(),
            Box::new(MemoryServerStream::new(CallContext::new(), &sent)) as BoxServerStream,
        ),
        &info,
        &handler,
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn unary_client_interceptor_can_add_call_options() {
    let with_limit = interceptor_fn::<UnaryClient<u32, usize>, _>(|call, _info, next| {
        next.run(call.with_option(grpc_middleware::CallOption::MaxRecvMessageSize(1024)))
    });
    let chained = chain([with_limit]);
    let invoker =
        |call: UnaryClientCall<u32>| async move { Ok::<_, Status>(call.options.len()) };
    let call = UnaryClientCall::new(
        CallContext::new(),
        ClientConn::new("http://localhost:50051"),
        METHOD,
        0,
    )
    .with_option(grpc_middleware::CallOption::WaitForReady(true));

    assert_eq!(invoke(&*chained, call, &(), &invoker).await.unwrap(), 2);
}

#[tokio::test]
async fn stream_client_chain_type_matches_default_shape() {
    let log = Log::default();
    let chained: InterceptorRef<StreamClient> = chain([tag("A", &log)]);
    let streamer = |call: StreamClientCall| async move {
        Ok::<BoxClientStream, Status>(Box::new(MemoryClientStream::new(call.ctx, &Log::default())))
    };
    let call = StreamClientCall::new(
        CallContext::new(),
        StreamDesc::new("Watch", false, true),
        ClientConn::new("https://svc.example"),
        "/demo.Greeter/Watch",
    );

    assert!(invoke(&*chained, call, &(), &streamer).await.is_ok());
    assert_eq!(log.entries(), ["A>", "<A"]);
}
