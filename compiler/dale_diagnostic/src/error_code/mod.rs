//! Error codes and their message templates.
//!
//! One table defines every code: its stable number, the phase that reports
//! it and its message template. The enum, `ALL`, the phase/template
//! lookups and raw-number conversion are all generated from that table, so
//! adding a code without a template is a compile error.
//!
//! Numbering: `E1xxx` lexer, `E2xxx` parser, `E3xxx` generator.

use std::fmt;

/// Compilation stage that reports an error.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Phase {
    Lexer,
    Parser,
    Generator,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Lexer => f.write_str("lexer"),
            Phase::Parser => f.write_str("parser"),
            Phase::Generator => f.write_str("generator"),
        }
    }
}

/// Template returned for raw codes that are not in the table.
pub const UNKNOWN_TEMPLATE: &str = "(Unknown)";

macro_rules! define_error_codes {
    ($(
        $(#[$doc:meta])*
        $name:ident = $raw:literal, $phase:ident, $template:literal;
    )*) => {
        /// Stable error identifier.
        #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
        #[repr(u16)]
        pub enum ErrorCode {
            $(
                $(#[$doc])*
                $name = $raw,
            )*
        }

        impl ErrorCode {
            /// Every error code, in table order.
            pub const ALL: &'static [ErrorCode] = &[$(ErrorCode::$name,)*];

            /// Phase that reports this code.
            pub const fn phase(self) -> Phase {
                match self {
                    $(ErrorCode::$name => Phase::$phase,)*
                }
            }

            /// Message template with positional `%s` placeholders.
            pub const fn template(self) -> &'static str {
                match self {
                    $(ErrorCode::$name => $template,)*
                }
            }

            /// Code string (e.g. `"E3024"`).
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(ErrorCode::$name => concat!("E", stringify!($raw)),)*
                }
            }

            /// Look up a code by its raw number.
            pub const fn from_raw(raw: u16) -> Option<ErrorCode> {
                match raw {
                    $($raw => Some(ErrorCode::$name),)*
                    _ => None,
                }
            }
        }
    };
}

define_error_codes! {
    // Lexer
    UnterminatedStringLiteral = 1001, Lexer, "unterminated string literal";
    InvalidInteger = 1002, Lexer, "invalid integer";
    InvalidFloatingPointNumber = 1003, Lexer, "invalid floating point number";

    // Parser
    ExpectedLeftParen = 2001, Parser, "expected left parenthesis";
    MissingLeftParen = 2002, Parser, "missing left parenthesis";
    MissingRightParen = 2003, Parser, "missing right parenthesis";

    // Generator: form shape
    CannotOnceTheLastOpenFile = 3001, Generator, "'once' cannot be used in the last open file";
    OnlyListsAtTopLevel = 3002, Generator, "top level elements must be lists";
    NoEmptyLists = 3003, Generator, "lists cannot be empty";
    FirstListElementMustBeAtom = 3004, Generator, "first list element must be atom";
    FirstListElementMustBeSymbol = 3005, Generator, "first list element must be symbol";
    NoEmptyDo = 3006, Generator, "'do' form must not be empty";
    IncorrectNumberOfArgs = 3007, Generator, "'%s' requires %s arguments (got %s instead)";
    IncorrectMinimumNumberOfArgs = 3008, Generator,
        "'%s' requires at least %s arguments (got %s instead)";
    IncorrectMaximumNumberOfArgs = 3009, Generator,
        "'%s' takes at most %s arguments (got %s instead)";
    IncorrectArgType = 3010, Generator, "'%s' requires %s for argument %s (got %s instead)";
    IncorrectSingleParameterType = 3011, Generator,
        "single parameter type must be %s (got %s instead)";
    IncorrectParameterTypeNumberOfArgs = 3012, Generator,
        "parameter type requires %s arguments (got %s instead)";
    UnexpectedElement = 3013, Generator, "expected %s for %s (got %s instead)";
    UnableToParseForm = 3014, Generator, "unable to parse form";

    // Generator: scope
    LabelNotInScope = 3020, Generator, "label not in scope: '%s'";
    TypeNotInScope = 3021, Generator, "type not in scope: '%s'";
    MacroNotInScope = 3022, Generator, "macro not in scope: '%s'";
    NamespaceNotInScope = 3023, Generator, "namespace not in scope: '%s'";
    OverloadedFunctionOrMacroNotInScope = 3024, Generator,
        "overloaded function/macro not in scope: '%s' (parameters are %s)";
    OverloadedFunctionOrMacroNotInScopeWithClosest = 3025, Generator,
        "overloaded function/macro not in scope: '%s' (parameters are %s, closest candidate expects %s)";
    NotInScope = 3026, Generator, "not in scope: '%s'";
    VariableNotInScope = 3027, Generator, "variable not in scope: '%s'";
    FunctionNotInScope = 3028, Generator,
        "function not in scope: '%s' (parameters are %s, function expects %s)";
    NamespaceNotInContext = 3029, Generator, "namespace '%s' does not exist in context";
    CannotDeactivateInactiveNamespace = 3030, Generator,
        "cannot deactivate inactive namespace '%s'";
    CannotDeactivateNonLastNamespace = 3031, Generator,
        "cannot deactivate namespace '%s'; it is not the most recently used namespace";
    /// Two candidates share the best overload score.
    AmbiguousOverload = 3032, Generator,
        "call to '%s' is ambiguous (parameters are %s; candidates expect %s and %s)";

    // Generator: definitions
    RedefinitionOfVariable = 3040, Generator,
        "variable '%s' has already been defined in this scope";
    RedeclarationOfEnum = 3041, Generator, "enum '%s' has already been defined";
    RedeclarationOfEnumElement = 3042, Generator, "enum element '%s' has already been defined";
    RedeclarationOfStruct = 3043, Generator,
        "struct '%s' has already been defined in this scope";
    RedeclarationOfLabel = 3044, Generator, "label '%s' has already been defined in this scope";
    RedeclarationOfFunctionOrMacro = 3045, Generator,
        "function/macro '%s' has already been defined in this scope";
    FunctionHasSameParamsAsMacro = 3046, Generator,
        "function '%s' has same parameters as an existing macro of that name";
    MacroHasSameParamsAsFunction = 3047, Generator,
        "macro '%s' has same parameters as an existing function of that name";
    ExternCXorOtherLinkageForName = 3048, Generator,
        "cannot have extern-c function for name as well as extern/intern functions for name: %s";
    ExternCInNamespace = 3049, Generator,
        "functions with extern-c linkage cannot be defined within a namespace";
    VoidMustBeTheOnlyParameter = 3050, Generator, "'void' must be the only parameter";
    VarArgsMustBeLastParameter = 3051, Generator,
        "the varargs specifier must be the last parameter";
    ArraysCannotBeFunctionParameters = 3052, Generator,
        "arrays cannot be function parameters; use a pointer instead";
    ReturnTypesCannotBeArrays = 3053, Generator,
        "return types cannot be arrays (use a pointer instead)";
    NonPointerFunctionParameter = 3054, Generator,
        "all function parameters must be pointers to functions";
    AttributesOfDeclAndDefAreDifferent = 3055, Generator,
        "attributes for the declaration of function '%s' do not match the attributes for the definition";
    InvalidAttribute = 3056, Generator, "invalid attribute";
    NoCoreFormNameInMacro = 3057, Generator, "core form names cannot be used as macro names";
    ThisCoreFormCannotBeOverridden = 3058, Generator, "this core form cannot be overridden";
    SetfOverridesMustReturnBool = 3059, Generator, "setf overrides must return bool";
    TypeNotAllowedInStruct = 3060, Generator, "'%s' fields are not allowed in structs";
    BitfieldMustHaveIntegerType = 3061, Generator, "bitfields must have an integer type";
    EnumTypeMustBeInteger = 3062, Generator, "enum types must be integers";
    /// Non-fatal: reported as a warning.
    StructContainsPadding = 3063, Generator, "struct contains padding, may cause problems";
    OnlyVarPermitted = 3064, Generator,
        "'def' within a function may only be used for var and struct forms";

    // Generator: variables
    CannotInitialiseExternVar = 3070, Generator, "'extern' variables cannot be initialised";
    HasBothExternAndInitialiser = 3071, Generator,
        "a function-scoped variable cannot have extern linkage as well as an initialiser";
    MustHaveInitialiserForImpliedType = 3072, Generator,
        "must have initialiser for variable with implied type";
    MustHaveInitialiserForConstType = 3073, Generator,
        "must have initialiser for variable with const type";
    MustHaveInitialiserForType = 3074, Generator,
        "must have initialiser for variable of this type";
    ZeroLengthGlobalArraysAreUnsupported = 3075, Generator,
        "zero-length global arrays are currently unsupported";
    CannotInstantiateOpaqueStruct = 3076, Generator, "cannot instantiate opaque struct";
    NonNullPointerInGlobalStructDeclaration = 3077, Generator,
        "cannot have non-null non-char pointer value in global struct declaration";
    CannotModifyConstVariable = 3078, Generator, "cannot modify const variable";

    // Generator: types and values
    InvalidType = 3090, Generator, "invalid type";
    CannotParseLiteral = 3091, Generator, "parsing literals of type %s is not supported";
    IncorrectType = 3092, Generator, "expected expression with type %s (got type %s instead)";
    IncorrectReturnType = 3093, Generator,
        "expected return expression with type %s (got type %s instead)";
    CannotDereferenceNonPointer = 3094, Generator, "cannot dereference non-pointer (type is %s)";
    CannotDereferenceVoidPointer = 3095, Generator, "cannot dereference void pointer (type is %s)";
    OverloadedFunctionAddressWithoutTypes = 3096, Generator,
        "cannot take address of overloaded function without also providing the function's types";
    InvalidCast = 3097, Generator, "unable to cast from type %s to type %s";
    FieldDoesNotExistInStruct = 3098, Generator, "field '%s' does not exist in struct %s";
    EnumValueDoesNotExist = 3099, Generator, "value '%s' does not exist for enum";
    IfBranchesHaveDifferentTypes = 3100, Generator,
        "'if' branches must have the same type (got %s and %s)";
    InvalidChar = 3101, Generator, "'%s' is not a valid char literal";
    TypeNotSupportedForMacro = 3102, Generator, "type %s cannot be used for macro parameters";
    UnableToParseInteger = 3103, Generator, "unable to parse integer %s";
    TypeIsNotFirstClass = 3104, Generator,
        "type %s cannot be used, because it is not a first-class type";
    IncorrectNumberOfArrayElements = 3105, Generator,
        "incorrect number of array elements (got %s, expected %s)";
    CanOnlyIndexIntoPointersAndArrays = 3106, Generator,
        "can only index into pointers and arrays (type of value is %s)";
    CannotTakeAddressOfNonLvalue = 3107, Generator, "cannot take address of non-lvalue";
    TypeNotSupported = 3108, Generator, "type %s is not supported on this platform";
    ValueWillNeverBeNull = 3109, Generator, "this value will never be null";
    RefsNotPermittedHere = 3110, Generator, "reference types not permitted in this context";
    RetvalsNotPermittedHere = 3111, Generator, "retval types not permitted in this context";
    GotoWillCrossDeclaration = 3112, Generator, "this goto will cross a declaration";
    ApplyMustTakePointerToStructAsFirstArgument = 3113, Generator,
        "the 'apply' function must take a pointer to the relevant struct as its first argument";

    // Generator: macros and internal faults
    GotNullPointerFromMacroCall = 3120, Generator, "macro '%s' returned a null pointer";
    DNodeHasNoString = 3121, Generator, "DNode returned by macro is an atom but has no string";
    DNodeIsNeitherTokenNorList = 3122, Generator,
        "DNode returned by macro is neither token nor list";
    NodeIsNeitherTokenNorList = 3123, Generator, "internal node is neither token nor list";
    /// Macro expansion recursed past the configured depth.
    MacroExpansionTooDeep = 3124, Generator,
        "expansion of macro '%s' exceeded the maximum depth of %s";
    UnableToConvertTypeToLLVMType = 3125, Generator, "unable to convert type %s to LLVM type";

    // Generator: files and modules
    NoSuchFileOrDirectory = 3140, Generator, "%s: no such file or directory";
    FileError = 3141, Generator, "%s: %s";
    ExternalError = 3142, Generator, "%s";
    CannotLinkModules = 3143, Generator, "cannot link modules: %s";
    ModuleDoesNotProvideForms = 3144, Generator,
        "module '%s' does not provide the following forms: %s";
    UnableToLoadModule = 3145, Generator, "unable to load module '%s'";
    InvalidModuleName = 3146, Generator,
        "module name '%s' is invalid: module names may only comprise alphanumeric characters, periods, hyphens and underscores";
    /// Error budget exhausted; processing stops.
    TooManyErrors = 3147, Generator, "aborting due to %s previous errors";
}

impl ErrorCode {
    /// Raw code number.
    #[inline]
    pub const fn raw(self) -> u16 {
        self as u16
    }

    /// Check if this code is reported by the reader (lexer or parser phase).
    pub const fn is_reader_error(self) -> bool {
        matches!(self.phase(), Phase::Lexer | Phase::Parser)
    }

    /// Check if this code signals a broken internal invariant.
    ///
    /// These stop the session rather than just failing the current form.
    pub const fn is_internal_fault(self) -> bool {
        matches!(
            self,
            ErrorCode::NodeIsNeitherTokenNorList
                | ErrorCode::DNodeIsNeitherTokenNorList
                | ErrorCode::DNodeHasNoString
                | ErrorCode::MacroExpansionTooDeep
        )
    }

    /// Number of `%s` placeholders in the template.
    pub fn arity(self) -> usize {
        self.template().matches("%s").count()
    }
}

/// Template for a raw code number, or `"(Unknown)"` if it is not a known code.
pub fn template_for_raw(raw: u16) -> &'static str {
    ErrorCode::from_raw(raw).map_or(UNKNOWN_TEMPLATE, ErrorCode::template)
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ErrorCode {
    type Err = ();

    /// Parse an error code string like `"E3024"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix('E').ok_or(())?;
        let raw: u16 = digits.parse().map_err(|_| ())?;
        ErrorCode::from_raw(raw).ok_or(())
    }
}

#[cfg(test)]
mod tests;
