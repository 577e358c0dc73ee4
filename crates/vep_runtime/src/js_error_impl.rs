//! Shared macro for implementing `JsErrorClass` for error types

/// Implement `JsErrorClass` for an op error type.
///
/// - The class is always `Error`: the script-side `failure` envelope only reads
///   `message` and `stack`, and user code that catches a failed call checks the message,
///   never the constructor
/// - The message is the error's `Display` output, so `Endpoint not found: <id>` and friends
///   reach `ExecutionResult::Failure` verbatim
/// - No additional properties; status codes are already part of the message
/// - The reference is the error itself
#[macro_export]
macro_rules! impl_js_error_class {
    ($error_type:ty) => {
        impl deno_error::JsErrorClass for $error_type {
            fn get_class(&self) -> std::borrow::Cow<'static, str> {
                std::borrow::Cow::Borrowed("Error")
            }

            fn get_message(&self) -> std::borrow::Cow<'static, str> {
                std::borrow::Cow::Owned(self.to_string())
            }

            fn get_additional_properties(
                &self,
            ) -> Box<dyn Iterator<Item = (std::borrow::Cow<'static, str>, deno_error::PropertyValue)>>
            {
                Box::new(std::iter::empty())
            }

            fn get_ref(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
                self
            }
        }
    };
}
