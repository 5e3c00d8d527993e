use neon_rtsp_protocol as rtsp;
use rtsp::{MethodView, Request, Response, Status};

/// Per-connection request handler. Every method defaults to
/// `405 Method Not Allowed`, so an implementation only overrides what it
/// supports.
pub trait Handler: Send {
    fn options(&mut self, request: rtsp::Options<'_>) -> Response {
        reply_method_not_allowed(&request)
    }

    fn describe(&mut self, request: rtsp::Describe<'_>) -> Response {
        reply_method_not_allowed(&request)
    }

    fn announce(&mut self, request: rtsp::Announce<'_>) -> Response {
        reply_method_not_allowed(&request)
    }

    fn setup(&mut self, request: rtsp::Setup<'_>) -> Response {
        reply_method_not_allowed(&request)
    }

    fn play(&mut self, request: rtsp::Play<'_>) -> Response {
        reply_method_not_allowed(&request)
    }

    fn pause(&mut self, request: rtsp::Pause<'_>) -> Response {
        reply_method_not_allowed(&request)
    }

    fn teardown(&mut self, request: rtsp::Teardown<'_>) -> Response {
        reply_method_not_allowed(&request)
    }

    fn get_parameter(&mut self, request: rtsp::GetParameter<'_>) -> Response {
        reply_method_not_allowed(&request)
    }

    fn set_parameter(&mut self, request: rtsp::SetParameter<'_>) -> Response {
        reply_method_not_allowed(&request)
    }

    fn record(&mut self, request: rtsp::Record<'_>) -> Response {
        reply_method_not_allowed(&request)
    }

    /// The connection this handler belongs to has gone away.
    fn closed(&mut self) {}

    fn handle(&mut self, view: MethodView<'_>) -> Response {
        match view {
            MethodView::Options(request) => self.options(request),
            MethodView::Describe(request) => self.describe(request),
            MethodView::Announce(request) => self.announce(request),
            MethodView::Setup(request) => self.setup(request),
            MethodView::Play(request) => self.play(request),
            MethodView::Pause(request) => self.pause(request),
            MethodView::Teardown(request) => self.teardown(request),
            MethodView::GetParameter(request) => self.get_parameter(request),
            MethodView::SetParameter(request) => self.set_parameter(request),
            MethodView::Record(request) => self.record(request),
        }
    }
}

#[inline]
fn reply_method_not_allowed(request: &Request) -> Response {
    tracing::debug!(method = %request.method, "no handler for method");
    Response::error(Status::MethodNotAllowed)
        .with_cseq_of(request)
        .build()
}

#[cfg(test)]
mod tests {

    use neon_rtsp_protocol::{decode, MethodView, Response};

    use super::Handler;

    struct OptionsOnly;

    impl Handler for OptionsOnly {
        fn options(&mut self, request: neon_rtsp_protocol::Options<'_>) -> Response {
            Response::ok().with_cseq_of(&request).build()
        }
    }

    fn handle(handler: &mut impl Handler, buf: &[u8]) -> Response {
        let (request, _) = decode(buf).unwrap();
        handler.handle(MethodView::of(&request).unwrap())
    }

    #[test]
    fn dispatches_by_method() {
        let response = handle(&mut OptionsOnly, b"OPTIONS * RTSP/1.0\r\nCSeq: 4\r\n\r\n");
        assert_eq!(response.status, 200);
        assert_eq!(response.header("CSeq"), Some("4"));
    }

    #[test]
    fn unhandled_method_not_allowed() {
        let response = handle(
            &mut OptionsOnly,
            b"RECORD rtsp://host/a RTSP/1.0\r\nCSeq: 5\r\n\r\n",
        );
        assert_eq!(response.status, 405);
        assert_eq!(response.header("CSeq"), Some("5"));
    }
}
