// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Android preference store via JNI.
//
// Backs `PreferenceStore` with a private `SharedPreferences` file owned by
// the hosting Activity. Writes use `Editor.apply()`, which updates the
// in-memory map synchronously and persists asynchronously.

#![cfg(target_os = "android")]

use jni::JNIEnv;
use jni::objects::{JObject, JString, JValue};

use airship_core::error::{AirshipError, Result};

use crate::traits::PreferenceStore;

/// SharedPreferences file name.
const PREFS_FILE: &str = "com.urbanairship.reactnative";

/// Obtain a [`JNIEnv`] handle from the global Android context.
fn jni_env() -> Result<JNIEnv<'static>> {
    let ctx = ndk_context::android_context();
    // SAFETY: `ctx.vm()` returns the `JavaVM*` set by the NDK glue code.
    // The pointer is valid for the lifetime of the process.
    let vm = unsafe { jni::JavaVM::from_raw(ctx.vm().cast()) }
        .map_err(|e| AirshipError::Bridge(format!("failed to obtain JavaVM: {e}")))?;
    vm.attach_current_thread_permanently()
        .map_err(|e| AirshipError::Bridge(format!("failed to attach JNI thread: {e}")))
}

/// The application context object handed to the NDK glue.
fn context() -> Result<JObject<'static>> {
    let ptr = ndk_context::android_context().context();
    if ptr.is_null() {
        return Err(AirshipError::Bridge(
            "Android context is null, native glue not initialised".into(),
        ));
    }
    // SAFETY: the NDK guarantees this pointer is a valid global jobject.
    Ok(unsafe { JObject::from_raw(ptr.cast()) })
}

fn jni_err(context: &str, e: jni::errors::Error) -> AirshipError {
    AirshipError::Preferences(format!("{context}: {e}"))
}

fn shared_preferences<'a>(env: &mut JNIEnv<'a>, context: &JObject<'_>) -> Result<JObject<'a>> {
    let j_name: JString = env
        .new_string(PREFS_FILE)
        .map_err(|e| jni_err("new_string(prefs_name)", e))?;

    env.call_method(
        context,
        "getSharedPreferences",
        "(Ljava/lang/String;I)Landroid/content/SharedPreferences;",
        &[
            JValue::Object(&j_name),
            JValue::Int(0), // MODE_PRIVATE
        ],
    )
    .map_err(|e| jni_err("getSharedPreferences", e))?
    .l()
    .map_err(|e| jni_err("getSharedPreferences->l", e))
}

fn editor<'a>(env: &mut JNIEnv<'a>, prefs: &JObject<'_>) -> Result<JObject<'a>> {
    env.call_method(
        prefs,
        "edit",
        "()Landroid/content/SharedPreferences$Editor;",
        &[],
    )
    .map_err(|e| jni_err("SharedPreferences.edit", e))?
    .l()
    .map_err(|e| jni_err("edit->l", e))
}

fn contains(env: &mut JNIEnv<'_>, prefs: &JObject<'_>, key: &JString<'_>) -> Result<bool> {
    env.call_method(
        prefs,
        "contains",
        "(Ljava/lang/String;)Z",
        &[JValue::Object(key)],
    )
    .map_err(|e| jni_err("contains", e))?
    .z()
    .map_err(|e| jni_err("contains->z", e))
}

/// `PreferenceStore` over Android `SharedPreferences`.
///
/// Zero-sized; every call resolves the JNI environment afresh so the store
/// can be used from any thread.
pub struct AndroidPreferences;

impl AndroidPreferences {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AndroidPreferences {
    fn default() -> Self {
        Self::new()
    }
}

impl PreferenceStore for AndroidPreferences {
    fn get_bool(&self, key: &str) -> Result<Option<bool>> {
        let mut env = jni_env()?;
        let context = context()?;
        let prefs = shared_preferences(&mut env, &context)?;
        let j_key = env
            .new_string(key)
            .map_err(|e| jni_err("new_string(key)", e))?;

        if !contains(&mut env, &prefs, &j_key)? {
            return Ok(None);
        }

        let value = env
            .call_method(
                &prefs,
                "getBoolean",
                "(Ljava/lang/String;Z)Z",
                &[JValue::Object(&j_key), JValue::Bool(0)],
            )
            .map_err(|e| jni_err("getBoolean", e))?
            .z()
            .map_err(|e| jni_err("getBoolean->z", e))?;
        Ok(Some(value))
    }

    fn put_bool(&self, key: &str, value: bool) -> Result<()> {
        let mut env = jni_env()?;
        let context = context()?;
        let prefs = shared_preferences(&mut env, &context)?;
        let editor = editor(&mut env, &prefs)?;
        let j_key = env
            .new_string(key)
            .map_err(|e| jni_err("new_string(key)", e))?;

        env.call_method(
            &editor,
            "putBoolean",
            "(Ljava/lang/String;Z)Landroid/content/SharedPreferences$Editor;",
            &[JValue::Object(&j_key), JValue::Bool(u8::from(value))],
        )
        .map_err(|e| jni_err("editor.putBoolean", e))?;

        env.call_method(&editor, "apply", "()V", &[])
            .map_err(|e| jni_err("editor.apply", e))?;

        tracing::debug!(key, value, "Android: boolean preference stored");
        Ok(())
    }

    fn get_string(&self, key: &str) -> Result<Option<String>> {
        let mut env = jni_env()?;
        let context = context()?;
        let prefs = shared_preferences(&mut env, &context)?;
        let j_key = env
            .new_string(key)
            .map_err(|e| jni_err("new_string(key)", e))?;

        let value: JObject = env
            .call_method(
                &prefs,
                "getString",
                "(Ljava/lang/String;Ljava/lang/String;)Ljava/lang/String;",
                &[JValue::Object(&j_key), JValue::Object(&JObject::null())],
            )
            .map_err(|e| jni_err("getString", e))?
            .l()
            .map_err(|e| jni_err("getString->l", e))?;

        if value.is_null() {
            return Ok(None);
        }

        let value: String = env
            .get_string(&JString::from(value))
            .map_err(|e| jni_err("get_string(value)", e))?
            .into();
        Ok(Some(value))
    }

    fn put_string(&self, key: &str, value: Option<&str>) -> Result<()> {
        let mut env = jni_env()?;
        let context = context()?;
        let prefs = shared_preferences(&mut env, &context)?;
        let editor = editor(&mut env, &prefs)?;
        let j_key = env
            .new_string(key)
            .map_err(|e| jni_err("new_string(key)", e))?;

        match value {
            Some(value) => {
                let j_value = env
                    .new_string(value)
                    .map_err(|e| jni_err("new_string(value)", e))?;
                env.call_method(
                    &editor,
                    "putString",
                    "(Ljava/lang/String;Ljava/lang/String;)Landroid/content/SharedPreferences$Editor;",
                    &[JValue::Object(&j_key), JValue::Object(&j_value)],
                )
                .map_err(|e| jni_err("editor.putString", e))?;
            }
            None => {
                env.call_method(
                    &editor,
                    "remove",
                    "(Ljava/lang/String;)Landroid/content/SharedPreferences$Editor;",
                    &[JValue::Object(&j_key)],
                )
                .map_err(|e| jni_err("editor.remove", e))?;
            }
        }

        env.call_method(&editor, "apply", "()V", &[])
            .map_err(|e| jni_err("editor.apply", e))?;

        tracing::debug!(key, cleared = value.is_none(), "Android: string preference stored");
        Ok(())
    }
}
