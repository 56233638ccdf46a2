use proc_macro2::TokenStream;
use quote::quote;
use syn::{ItemFn, ReturnType, Signature, Stmt};

pub enum TokioMode {
    Main,
    Test,
}

/// See `#[espruino_macros::runtime]` for details.
///
/// This method works on proc_macro2 TokenStream in order to allow testing the expansion
/// outside a compiler invocation.
pub fn runtime_macro(item: TokenStream, tokio: TokioMode) -> TokenStream {
    let espruino_runner = quote!(::espruino_runner);

    let input: ItemFn = match syn::parse2(item) {
        Ok(input) => input,
        Err(err) => return err.to_compile_error(),
    };

    let ItemFn {
        attrs,
        vis,
        sig,
        block,
    } = input;

    // The generated function drives the runtime itself: it is not async anymore.
    let sync_sig = Signature {
        asyncness: None,
        ..sig
    };

    let mut stmts = block.stmts;

    let has_return_type = match &sync_sig.output {
        ReturnType::Default => false,
        ReturnType::Type(_, ty) => {
            !matches!(&**ty, syn::Type::Tuple(tuple) if tuple.elems.is_empty())
        }
    };

    // The tail expression (if any) must be evaluated after all tasks are done.
    let return_expr = if has_return_type {
        match stmts.pop() {
            Some(Stmt::Expr(expr, None)) => Some(expr),
            Some(stmt) => {
                stmts.push(stmt);
                None
            }
            None => None,
        }
    } else {
        None
    };

    let test_attr = match tokio {
        TokioMode::Main => quote! {},
        TokioMode::Test => quote! {
            #[test]
            #[::serial_test::serial]
        },
    };

    let tokio_runtime = match tokio {
        TokioMode::Main => quote! {
            let rt = #espruino_runner::utils::tokio::runtime::Builder::new_multi_thread()
                .worker_threads(4)
                .enable_all()
                .build()
                .unwrap();
        },
        TokioMode::Test => quote! {
            let rt = #espruino_runner::utils::tokio::runtime::Runtime::new().unwrap();
        },
    };

    let mut body = vec![quote! {
        #espruino_runner::utils::task::init_task_channel().await;
    }];

    body.extend(stmts.into_iter().map(|stmt| match stmt {
        // A bare "()" tail is dropped: the block value is built below.
        Stmt::Expr(syn::Expr::Tuple(ref tuple), _) if tuple.elems.is_empty() => quote!(),
        _ => quote! { #stmt },
    }));

    body.push(quote! {
        #espruino_runner::utils::task::wait_for_tasks().await;
    });

    if let Some(return_stmt) = return_expr {
        body.push(quote! { #return_stmt });
    }

    quote! {
        #test_attr
        #(#attrs)*
        #vis #sync_sig {
            #tokio_runtime
            rt.block_on(async {
                #(#body)*
            })
        }
    }
}
