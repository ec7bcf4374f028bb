use rexpro_core::Response;

/// Destination for responses written while a message is being filtered.
pub trait ResponseSink {
    fn write(&mut self, response: Response);
}

impl ResponseSink for Vec<Response> {
    fn write(&mut self, response: Response) {
        self.push(response);
    }
}
